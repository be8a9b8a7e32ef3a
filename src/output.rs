//! Image sinks for a rendered framebuffer

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::renderer::Framebuffer;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write image: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported output format: {0} (expected .ppm or .png)")]
    UnsupportedFormat(String),

    #[error("Image too large for the encoder: {width}x{height}")]
    TooLarge { width: usize, height: usize },
}

/// Output file formats, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Ppm,
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, OutputError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("ppm") => Ok(OutputFormat::Ppm),
            Some("png") => Ok(OutputFormat::Png),
            _ => Err(OutputError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Binary PPM (P6): text header followed by packed 8-bit RGB
pub fn write_ppm<W: Write>(framebuffer: &Framebuffer, mut writer: W) -> io::Result<()> {
    write!(
        writer,
        "P6\n{} {}\n255\n",
        framebuffer.width(),
        framebuffer.height()
    )?;
    writer.write_all(&framebuffer.to_rgb_bytes())?;
    writer.flush()
}

fn write_png(framebuffer: &Framebuffer, path: &Path) -> Result<(), OutputError> {
    let too_large = || OutputError::TooLarge {
        width: framebuffer.width(),
        height: framebuffer.height(),
    };
    let width = u32::try_from(framebuffer.width()).map_err(|_| too_large())?;
    let height = u32::try_from(framebuffer.height()).map_err(|_| too_large())?;

    let img = image::RgbImage::from_raw(width, height, framebuffer.to_rgb_bytes())
        .ok_or_else(too_large)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Write `framebuffer` to `path` in the format its extension names
pub fn save(framebuffer: &Framebuffer, path: &Path) -> Result<OutputFormat, OutputError> {
    let format = OutputFormat::from_path(path)?;
    match format {
        OutputFormat::Ppm => {
            let file = File::create(path)?;
            write_ppm(framebuffer, BufWriter::new(file))?;
        }
        OutputFormat::Png => write_png(framebuffer, path)?,
    }

    tracing::info!(
        path = %path.display(),
        format = ?format,
        width = framebuffer.width(),
        height = framebuffer.height(),
        "Image written"
    );
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn two_pixels() -> Framebuffer {
        Framebuffer::from_pixels(
            2,
            1,
            vec![Vector3::new(1.0, 0.5, 0.0), Vector3::new(0.2, 0.7, 0.8)],
        )
        .unwrap()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out.ppm")).unwrap(),
            OutputFormat::Ppm
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("render.PNG")).unwrap(),
            OutputFormat::Png
        );
        assert!(matches!(
            OutputFormat::from_path(Path::new("out.jpg")),
            Err(OutputError::UnsupportedFormat(_))
        ));
        assert!(OutputFormat::from_path(Path::new("out")).is_err());
    }

    fn ppm_bytes(framebuffer: &Framebuffer) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_ppm(framebuffer, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_write_ppm() {
        let bytes = ppm_bytes(&two_pixels());
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&bytes[..header.len()], header);
        // 0.5 * 255 = 127.5 truncates to 127; 0.7 * 255 = 178.5 truncates to 178
        assert_eq!(&bytes[header.len()..], &[255, 127, 0, 51, 178, 204]);
    }

    #[test]
    fn test_save_ppm() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.ppm");
        let format = save(&two_pixels(), &path).unwrap();
        assert_eq!(format, OutputFormat::Ppm);
        assert_eq!(std::fs::read(&path).unwrap(), ppm_bytes(&two_pixels()));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        save(&two_pixels(), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 127, 0]);
    }

    #[test]
    fn test_save_unsupported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.bmp");
        assert!(save(&two_pixels(), &path).is_err());
        assert!(!path.exists());
    }
}

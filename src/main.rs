//! sphere_rt: render a scene of spheres and point lights to a PPM or PNG file
//!
//! Usage:
//!   sphere_rt render                         - reference scene to out.ppm
//!   sphere_rt --config scene.yaml render -o scene.png --preview
//!   sphere_rt check-config --config scene.yaml
//!   sphere_rt dump-scene > scene.yaml

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use sphere_rt::{config::AppConfig, output, Renderer};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "sphere_rt")]
#[command(version = "0.1.0")]
#[command(about = "Recursive ray tracer for spheres and point lights")]
#[command(long_about = "
sphere_rt traces one ray per pixel through a scene of spheres lit by point
lights, with diffuse and specular shading, hard shadows and mirror
reflections.

Without --config it looks for scene.yaml / scene.yml in the current
directory and falls back to the built-in four-sphere reference scene.

Example usage:
  sphere_rt render -o out.ppm
  sphere_rt --config scene.yaml render --width 1920 --height 1080 -o out.png
")]
struct Cli {
    /// Path to a YAML scene file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the scene to an image file
    Render {
        /// Output path; the extension picks the format (.ppm or .png)
        #[arg(short, long, default_value = "out.ppm")]
        output: PathBuf,
        /// Override image width
        #[arg(long)]
        width: Option<usize>,
        /// Override image height
        #[arg(long)]
        height: Option<usize>,
        /// Override vertical field of view (radians)
        #[arg(long)]
        fov: Option<f32>,
        /// Render on the calling thread only
        #[arg(long)]
        sequential: bool,
        /// Print an ASCII preview of the result to stdout
        #[arg(long)]
        preview: bool,
    },

    /// Validate the scene file and print a summary
    CheckConfig,

    /// Print the effective scene configuration as YAML
    DumpScene,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            output,
            width,
            height,
            fov,
            sequential,
            preview,
        } => {
            let mut config = load_config_or_exit(cli.config.as_deref());

            // Apply CLI overrides
            if let Some(width) = width {
                config.render.width = width;
            }
            if let Some(height) = height {
                config.render.height = height;
            }
            if let Some(fov) = fov {
                config.render.fov = fov;
            }
            if sequential {
                config.render.parallel = false;
            }
            if let Err(e) = config.validate() {
                eprintln!("Invalid render settings: {}", e);
                std::process::exit(1);
            }

            render(&config, &output, preview)?;
        }
        Commands::CheckConfig => {
            check_config(cli.config.as_deref());
        }
        Commands::DumpScene => {
            let config = load_config_or_exit(cli.config.as_deref());
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

/// Render and write the image, optionally previewing it in the terminal
fn render(
    config: &AppConfig,
    output_path: &Path,
    preview: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Fail on a bad extension before spending time on the render
    output::OutputFormat::from_path(output_path)?;

    let scene = config.scene();
    let renderer = Renderer::new(config.render.camera(), config.shading)
        .with_parallel(config.render.parallel);

    let framebuffer = renderer.render(&scene)?;
    output::save(&framebuffer, output_path)?;

    if preview {
        let columns = match crossterm::terminal::size() {
            Ok((w, _)) => w as usize,
            Err(e) => {
                tracing::debug!(error = %e, "Could not get terminal size, using 80 columns");
                80
            }
        };
        print!("{}", framebuffer.to_ascii(columns.max(10)));
    }

    println!("Rendered image saved as {}", output_path.display());
    Ok(())
}

/// Validate configuration and print a summary
fn check_config(config_path: Option<&Path>) {
    match AppConfig::load_or_default(config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid\n");
            println!("Render:");
            println!("  Size: {}x{}", config.render.width, config.render.height);
            println!("  FOV: {:.4} rad", config.render.fov);
            println!("  Parallel: {}", config.render.parallel);
            println!("\nShading:");
            let bg = config.shading.background;
            println!("  Background: ({}, {}, {})", bg.x, bg.y, bg.z);
            println!("  Bias: {}", config.shading.bias);
            println!("  Max depth: {}", config.shading.max_depth);
            println!("  Specular weight: {}", config.shading.specular_weight);
            println!("\nScene:");
            println!("  Spheres: {}", config.spheres.len());
            for (i, s) in config.spheres.iter().enumerate() {
                println!(
                    "    [{}] center ({}, {}, {}) r={} refl={}",
                    i, s.center.x, s.center.y, s.center.z, s.radius, s.material.reflectivity
                );
            }
            println!("  Lights: {}", config.lights.len());
            for (i, l) in config.lights.iter().enumerate() {
                println!(
                    "    [{}] position ({}, {}, {}) intensity={}",
                    i, l.position.x, l.position.y, l.position.z, l.intensity
                );
            }
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load configuration or exit with error
fn load_config_or_exit(config_path: Option<&Path>) -> AppConfig {
    if let Some(path) = config_path {
        tracing::info!("Loading configuration from {:?}", path);
    }
    match AppConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            eprintln!("\nGenerate a starting point with:");
            eprintln!("  sphere_rt dump-scene > scene.yaml");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_overrides() {
        let cli = Cli::parse_from([
            "sphere_rt",
            "--config",
            "scene.yaml",
            "render",
            "-o",
            "img.png",
            "--width",
            "320",
            "--sequential",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("scene.yaml")));
        match cli.command {
            Commands::Render {
                output,
                width,
                height,
                sequential,
                preview,
                ..
            } => {
                assert_eq!(output, PathBuf::from("img.png"));
                assert_eq!(width, Some(320));
                assert_eq!(height, None);
                assert!(sequential);
                assert!(!preview);
            }
            _ => panic!("expected render subcommand"),
        }
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }
}

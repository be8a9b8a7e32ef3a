use std::path::Path;

use super::{AppConfig, ConfigError};

/// Load and validate a scene configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        spheres = config.spheres.len(),
        lights = config.lights.len(),
        "Scene configuration loaded"
    );

    Ok(config)
}

//! Loading [`ImpactConfig`] from TOML.
//!
//! ```toml
//! radius_km = 5.0
//! distance_model = "planar"   # or "haversine"
//! min_scale = "HIGH"          # optional
//! ```
//!
//! Missing keys fall back to [`ImpactConfig::default`].

use std::path::Path;

use smartpms_impact_models::ImpactConfig;

/// Environment variable naming an engine config file.
pub const CONFIG_ENV_VAR: &str = "SMARTPMS_IMPACT_CONFIG";

/// Errors loading engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that was being read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid config TOML.
    #[error("Invalid impact config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Parses engine settings from a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if the string is not valid config TOML.
pub fn parse_config(toml_str: &str) -> Result<ImpactConfig, ConfigError> {
    Ok(toml::from_str(toml_str)?)
}

/// Reads engine settings from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<ImpactConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&contents)?;
    log::info!(
        "Loaded impact config from {}: radius {} km, {} distance",
        path.display(),
        config.radius_km,
        config.distance_model
    );
    Ok(config)
}

/// Loads settings from the file named by [`CONFIG_ENV_VAR`], or defaults
/// if the variable is unset.
///
/// # Errors
///
/// Returns [`ConfigError`] if the variable is set but the file cannot be
/// read or parsed.
pub fn load_config_from_env() -> Result<ImpactConfig, ConfigError> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.is_empty() => load_config(Path::new(&path)),
        _ => Ok(ImpactConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use smartpms_impact_models::DistanceModel;

    use super::*;

    #[test]
    fn parses_partial_config() {
        let config = parse_config("distance_model = \"haversine\"").unwrap();
        assert_eq!(config.distance_model, DistanceModel::Haversine);
        assert!((config.radius_km - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unknown_model() {
        assert!(matches!(
            parse_config("distance_model = \"manhattan\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

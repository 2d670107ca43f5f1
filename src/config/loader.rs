//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ImdsConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ImdsConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ImdsConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_rejects_invalid_ttl() {
        let mut file = tempfile_path("imds-config-invalid");
        writeln!(file.1, "token_ttl_secs = 999999").unwrap();
        let err = load_config(&file.0).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        let _ = fs::remove_file(&file.0);
    }

    #[test]
    fn test_load_roundtrip() {
        let mut file = tempfile_path("imds-config-ok");
        writeln!(
            file.1,
            "endpoint = \"http://[fd00:ec2::254]\"\n[retry]\nmax_retries = 5"
        )
        .unwrap();
        let config = load_config(&file.0).unwrap();
        assert_eq!(config.endpoint, "http://[fd00:ec2::254]");
        assert_eq!(config.retry.max_retries, 5);
        let _ = fs::remove_file(&file.0);
    }

    fn tempfile_path(name: &str) -> (std::path::PathBuf, fs::File) {
        let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        let file = fs::File::create(&path).unwrap();
        (path, file)
    }
}

//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::path::Path;

use crate::config::schema::{LogFormat, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line or through the environment.
///
/// Every field left as `None` keeps the value from the file (or the default).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upstream: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    /// Apply the overrides on top of a parsed configuration.
    pub fn apply(self, config: &mut ProxyConfig) {
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(origin) = self.upstream {
            config.upstream.origin = origin;
        }
        if let Some(secs) = self.timeout_secs {
            config.upstream.timeout_secs = secs;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration: defaults, then the optional file, then overrides.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("cors-relay-{}-{}.toml", name, std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_file_and_validates() {
        let path = write_temp(
            "load",
            r#"
            [listener]
            port = 9001

            [upstream]
            origin = "http://10.0.0.5:7001"
            timeout_secs = 3
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.port, 9001);
        assert_eq!(config.upstream.origin, "http://10.0.0.5:7001");
        assert_eq!(config.upstream.timeout_secs, 3);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_file_reports_validation_errors() {
        let path = write_temp(
            "invalid",
            r#"
            [upstream]
            origin = "ftp://files"
            timeout_secs = 0
            "#,
        );

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let path = write_temp("malformed", "[upstream\norigin = ");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn overrides_win_over_file() {
        let path = write_temp(
            "override",
            r#"
            [upstream]
            origin = "http://from-file:7001"
            "#,
        );

        let overrides = ConfigOverrides {
            port: Some(0),
            upstream: Some("http://from-cli:7002".into()),
            log_format: Some(LogFormat::Json),
            ..Default::default()
        };

        let config = resolve_config(Some(&path), overrides).unwrap();
        assert_eq!(config.upstream.origin, "http://from-cli:7002");
        assert_eq!(config.listener.port, 0);
        assert_eq!(config.observability.log_format, LogFormat::Json);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn overrides_are_validated() {
        let overrides = ConfigOverrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(None, overrides),
            Err(ConfigError::Validation(_))
        ));
    }
}

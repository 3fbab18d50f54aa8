//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::LoaderConfig;
use std::path::Path;

/// Loads and validates a `kiln.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<LoaderConfig, ConfigError> {
    let config_path = project_dir.join("kiln.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LoaderConfig, ConfigError> {
    let config: LoaderConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable.
fn validate_config(config: &LoaderConfig) -> Result<(), ConfigError> {
    let ext = &config.source.extension;
    if ext.is_empty() {
        return Err(ConfigError::ValidationError(
            "source.extension must not be empty".to_string(),
        ));
    }
    if ext.contains('.') || ext.contains('/') {
        return Err(ConfigError::ValidationError(format!(
            "source.extension '{ext}' must be a bare extension"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecompileMode;
    use std::path::PathBuf;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.recompile.mode, RecompileMode::Inherit);
        assert_eq!(config.source.extension, "kn");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[recompile]
mode = "on"
enabled = true
minimum_interval_ms = 250

[source]
roots = ["scripts", "lib"]
extension = "kn"

[output]
dir = "target/units"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.recompile.mode, RecompileMode::On);
        assert!(config.recompile.enabled);
        assert_eq!(config.recompile.minimum_interval_ms, 250);
        assert_eq!(
            config.source.roots,
            vec![PathBuf::from("scripts"), PathBuf::from("lib")]
        );
        assert_eq!(config.output.dir, Some(PathBuf::from("target/units")));
    }

    #[test]
    fn mode_off_parses() {
        let config = load_config_from_str("[recompile]\nmode = \"off\"\n").unwrap();
        assert_eq!(config.recompile.mode, RecompileMode::Off);
    }

    #[test]
    fn unknown_mode_errors() {
        let err = load_config_from_str("[recompile]\nmode = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_extension_errors() {
        let err = load_config_from_str("[source]\nextension = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn dotted_extension_errors() {
        let err = load_config_from_str("[source]\nextension = \".kn\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}

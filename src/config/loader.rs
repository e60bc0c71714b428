use std::path::Path;

use config::{Config, File, FileFormat};
use eyre::{Context, Result};

use crate::config::{models::ClientConfig, validation::ClientConfigValidator};

/// Load and validate configuration from a file using the config crate
/// Supports multiple formats: YAML, JSON, TOML, etc.
pub fn load_config(config_path: &str) -> Result<ClientConfig> {
    let config = load_config_unchecked(config_path)?;
    ClientConfigValidator::validate(&config)
        .with_context(|| format!("Invalid configuration in {config_path}"))?;
    Ok(config)
}

/// Load configuration without validation (used for the check-config command)
pub fn load_config_unchecked(config_path: &str) -> Result<ClientConfig> {
    let config_path = Path::new(config_path);

    // Determine file format based on extension
    let format = match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("ini") => FileFormat::Ini,
        _ => FileFormat::Toml,
    };

    let settings = Config::builder()
        .add_source(File::new(
            config_path
                .to_str()
                .ok_or_else(|| eyre::eyre!("Invalid UTF-8 path: {}", config_path.display()))?,
            format,
        ))
        .build()
        .with_context(|| format!("Failed to build config from {}", config_path.display()))?;

    let client_config: ClientConfig = settings.try_deserialize().with_context(|| {
        format!(
            "Failed to deserialize config from {}",
            config_path.display()
        )
    })?;

    Ok(client_config)
}

/// Load the file when a path is given, otherwise fall back to built-in defaults
pub fn load_config_or_default(config_path: Option<&str>) -> Result<ClientConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok(ClientConfig::default())
        }
    }
}

/// Commented starter file written by the init command
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# formpost configuration

# Contact endpoint the form is posted to
endpoint = "https://vj5g5k1f4b.execute-api.us-east-1.amazonaws.com/dev/contact"

# Per-attempt deadline (seconds)
timeout_secs = 30

# Retries after the first attempt; 4xx answers are never retried
retries = 2

# user_agent = "formpost/0.1.0"

# Exponential backoff between attempts: min(initial * 2^attempt, max)
[backoff]
initial_delay_ms = 1000
max_delay_ms = 5000

# GET <endpoint with /contact replaced by /health>
[health_check]
timeout_secs = 5
"#;

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_load_toml_config() {
        let toml_content = r#"
endpoint = "http://127.0.0.1:9000/api/contact"
retries = 4

[backoff]
initial_delay_ms = 200
max_delay_ms = 1000
"#;

        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/api/contact");
        assert_eq!(config.retries, 4);
        assert_eq!(config.backoff.initial_delay_ms, 200);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_load_yaml_config() {
        let yaml_content = r#"
endpoint: "https://forms.example.com/prod/contact"
timeout_secs: 10
health_check:
  timeout_secs: 2
"#;

        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.health_check.timeout_secs, 2);
        assert_eq!(config.retries, 2);
    }

    #[test]
    fn test_load_json_config() {
        let json_content = r#"
{
  "endpoint": "https://forms.example.com/prod/contact",
  "retries": 0
}
"#;

        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{}", json_content).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "timeout_secs = 0\n").unwrap();

        let path = temp_file.path().to_str().unwrap();
        assert!(load_config(path).is_err());
        assert_eq!(load_config_unchecked(path).unwrap().timeout_secs, 0);
    }

    #[test]
    fn test_default_template_loads_back_as_defaults() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "{}", DEFAULT_CONFIG_TEMPLATE).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_missing_path_falls_back_to_defaults() {
        let config = load_config_or_default(None).unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}

pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Clone, Parser)]
#[command(name = "objection-etl")]
#[command(about = "Forwards objection letters to a REST API with Basic authentication")]
pub struct CliConfig {
    #[arg(long, env = "API_ENDPOINT")]
    pub api_endpoint: String,

    #[arg(long, env = "API_USERNAME")]
    pub api_username: String,

    #[arg(long, env = "API_PASSWORD", hide_env_values = true, default_value = "")]
    pub api_password: String,

    #[arg(long, env = "OBJECTIONS_INPUT", default_value = "objections.csv")]
    pub input_path: String,

    #[arg(long, default_value = "./output/success.csv")]
    pub success_output_path: String,

    #[arg(long, default_value = "./output/error.csv")]
    pub error_output_path: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

// 密碼不得出現在日誌中
#[cfg(feature = "cli")]
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_username", &self.api_username)
            .field("api_password", &"***")
            .field("input_path", &self.input_path)
            .field("success_output_path", &self.success_output_path)
            .field("error_output_path", &self.error_output_path)
            .field("log_format", &self.log_format)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_username(&self) -> &str {
        &self.api_username
    }

    fn api_password(&self) -> &str {
        &self.api_password
    }

    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn success_output_path(&self) -> &str {
        &self.success_output_path
    }

    fn error_output_path(&self) -> &str {
        &self.error_output_path
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_non_empty_string("api_username", &self.api_username)?;
        validate_path("input_path", &self.input_path)?;
        validate_path("success_output_path", &self.success_output_path)?;
        validate_path("error_output_path", &self.error_output_path)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_flags() {
        let config = CliConfig::try_parse_from([
            "objection-etl",
            "--api-endpoint",
            "https://api.example.com/objections",
            "--api-username",
            "etl_user",
            "--api-password",
            "s3cret",
            "--input-path",
            "data/objections.csv",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.api_endpoint(), "https://api.example.com/objections");
        assert_eq!(config.api_username(), "etl_user");
        assert_eq!(config.api_password(), "s3cret");
        assert_eq!(config.input_path(), "data/objections.csv");
        assert_eq!(config.success_output_path(), "./output/success.csv");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = CliConfig::try_parse_from([
            "objection-etl",
            "--api-endpoint",
            "https://api.example.com/objections",
            "--api-username",
            "etl_user",
            "--api-password",
            "s3cret",
        ])
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("etl_user"));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint_and_username() {
        let mut config = CliConfig::try_parse_from([
            "objection-etl",
            "--api-endpoint",
            "ftp://api.example.com",
            "--api-username",
            "etl_user",
        ])
        .unwrap();
        assert!(config.validate().is_err());

        config.api_endpoint = "https://api.example.com".to_string();
        config.api_username = " ".to_string();
        assert!(config.validate().is_err());
    }
}

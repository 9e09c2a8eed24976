use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub success_path: String,
    pub error_path: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_PASSWORD})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.endpoint", &self.api.endpoint)?;
        validate_non_empty_string("api.username", &self.api.username)?;
        validate_path("input.path", &self.input.path)?;
        validate_path("output.success_path", &self.output.success_path)?;
        validate_path("output.error_path", &self.output.error_path)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.api.endpoint
    }

    fn api_username(&self) -> &str {
        &self.api.username
    }

    fn api_password(&self) -> &str {
        &self.api.password
    }

    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn success_output_path(&self) -> &str {
        &self.output.success_path
    }

    fn error_output_path(&self) -> &str {
        &self.output.error_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[api]
endpoint = "https://api.example.com/objections"
username = "etl_user"
password = "s3cret"

[input]
path = "objections.csv"

[output]
success_path = "./out/success.csv"
error_path = "./out/error.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_endpoint(), "https://api.example.com/objections");
        assert_eq!(config.api_username(), "etl_user");
        assert_eq!(config.api_password(), "s3cret");
        assert_eq!(config.input_path(), "objections.csv");
        assert_eq!(config.error_output_path(), "./out/error.csv");
        assert!(config.validate().is_ok());
        assert!(!format!("{:?}", config).contains("s3cret"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_OBJECTION_API_PASSWORD", "from-env");

        let toml_content = r#"
[api]
endpoint = "https://api.example.com/objections"
username = "etl_user"
password = "${TEST_OBJECTION_API_PASSWORD}"

[input]
path = "objections.csv"

[output]
success_path = "success.csv"
error_path = "error.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.password, "from-env");

        std::env::remove_var("TEST_OBJECTION_API_PASSWORD");
    }

    #[test]
    fn test_unresolved_placeholder_is_kept() {
        let toml_content = r#"
[api]
endpoint = "${TEST_OBJECTION_UNSET_ENDPOINT}"
username = "etl_user"

[input]
path = "objections.csv"

[output]
success_path = "success.csv"
error_path = "error.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.endpoint, "${TEST_OBJECTION_UNSET_ENDPOINT}");
        assert_eq!(config.api.password, "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let toml_content = r#"
[api]
endpoint = "https://api.example.com/objections"
username = "etl_user"
"#;

        let err = TomlConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[api]
endpoint = "http://localhost:8080/api/objections"
username = "etl_user"
password = ""

[input]
path = "objections.csv"

[output]
success_path = "success.csv"
error_path = "error.csv"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api_endpoint(), "http://localhost:8080/api/objections");
        assert!(config.validate().is_ok());
    }
}

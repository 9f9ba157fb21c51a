use crate::domain::model::ModelCode;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "titanic-survival.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// What `GET /` serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Variant {
    /// Plain welcome text
    Welcome,
    /// Prediction form
    Predict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub variant: Variant,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4004,
            variant: Variant::Predict,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dataset_path: String,
    pub model_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: "data/titanic.csv".to_string(),
            model_dir: "models".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub default_code: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_code: ModelCode::DEFAULT.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
            verbose: false,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Explicit path must exist; otherwise `titanic-survival.toml` is used
    /// when present, else built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${MODEL_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Configured code, resolved with the logistic-regression fallback.
    pub fn default_model(&self) -> ModelCode {
        ModelCode::resolve(&self.model.default_code)
    }

    pub fn model_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.model_dir)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_path("data.dataset_path", &self.data.dataset_path)?;
        validate_path("data.model_dir", &self.data.model_dir)?;
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;

        if ModelCode::parse(&self.model.default_code).is_none() {
            tracing::warn!(
                "Unknown model code '{}', falling back to '{}'",
                self.model.default_code,
                ModelCode::DEFAULT
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 5005
variant = "welcome"

[data]
dataset_path = "/srv/titanic.csv"
model_dir = "/srv/models"

[model]
default_code = "svc"

[logging]
format = "json"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:5005");
        assert_eq!(config.server.variant, Variant::Welcome);
        assert_eq!(config.default_model(), ModelCode::Svc);
        assert_eq!(config.model_dir(), PathBuf::from("/srv/models"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_toml_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.variant, Variant::Predict);
        assert_eq!(config.data.dataset_path, "data/titanic.csv");
        assert_eq!(config.default_model(), ModelCode::Lr);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TITANIC_TEST_MODEL_DIR", "/tmp/titanic-models");

        let config =
            AppConfig::from_toml_str("[data]\nmodel_dir = \"${TITANIC_TEST_MODEL_DIR}\"\n").unwrap();
        assert_eq!(config.data.model_dir, "/tmp/titanic-models");

        std::env::remove_var("TITANIC_TEST_MODEL_DIR");
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.data.model_dir = String::new();
        assert!(matches!(
            config.validate(),
            Err(AppError::MissingConfigError { field }) if field == "data.model_dir"
        ));

        // 未知模型代碼只會警告
        let mut config = AppConfig::default();
        config.model.default_code = "knn".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_model(), ModelCode::Lr);
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        assert!(AppConfig::from_toml_str("[server]\nvariant = \"admin\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[model]\ndefault_code = \"dt\"\n")
            .unwrap();

        let config = AppConfig::load(temp_file.path().to_str()).unwrap();
        assert_eq!(config.default_model(), ModelCode::Dt);
        assert!(AppConfig::load(Some("/nonexistent/titanic.toml")).is_err());
    }
}

pub mod cli;

use crate::core::analysis::DEFAULT_TABLE_NAME;
use crate::core::http::RetryPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "etl-config.toml";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    pub faker: FakerConfig,
    pub http: Option<HttpConfig>,
    pub analysis: Option<AnalysisConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FakerConfig {
    pub base_url: String,
    pub import_data_size: u64,
    pub date_interval: u32,
    pub rate_limit_sleep_time: f64,
    pub start_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub table_name: Option<String>,
}

impl EtlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FAKER_BASE_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn request_timeout(&self) -> Duration {
        let seconds = self
            .http
            .as_ref()
            .and_then(|h| h.timeout_seconds)
            .unwrap_or(30);
        Duration::from_secs(seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        let http = self.http.clone().unwrap_or_default();
        RetryPolicy {
            max_retries: http.retry_attempts.unwrap_or(defaults.max_retries),
            delay: http
                .retry_delay_seconds
                .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
                .unwrap_or(defaults.delay),
        }
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.faker.rate_limit_sleep_time).unwrap_or_default()
    }

    pub fn table_name(&self) -> &str {
        self.analysis
            .as_ref()
            .and_then(|a| a.table_name.as_deref())
            .unwrap_or(DEFAULT_TABLE_NAME)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("faker.base_url", &self.faker.base_url)?;
        validation::validate_positive_number(
            "faker.import_data_size",
            self.faker.import_data_size,
            1,
        )?;
        validation::validate_positive_number(
            "faker.date_interval",
            u64::from(self.faker.date_interval),
            1,
        )?;
        validation::validate_non_negative_seconds(
            "faker.rate_limit_sleep_time",
            self.faker.rate_limit_sleep_time,
        )?;
        validation::validate_date("faker.start_date", &self.faker.start_date)?;

        if let Some(http) = &self.http {
            if let Some(timeout) = http.timeout_seconds {
                validation::validate_positive_number("http.timeout_seconds", timeout, 1)?;
            }
            if let Some(delay) = http.retry_delay_seconds {
                validation::validate_non_negative_seconds("http.retry_delay_seconds", delay)?;
            }
        }

        validation::validate_non_empty_string("analysis.table_name", self.table_name())?;

        Ok(())
    }
}

impl ConfigProvider for EtlConfig {
    fn base_url(&self) -> &str {
        &self.faker.base_url
    }

    fn import_data_size(&self) -> u64 {
        self.faker.import_data_size
    }

    fn date_interval(&self) -> u32 {
        self.faker.date_interval
    }

    fn start_date(&self) -> &str {
        &self.faker.start_date
    }
}

impl Validate for EtlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_CONFIG: &str = r#"
[faker]
base_url = "https://fakerapi.it/api/v2"
import_data_size = 30000
date_interval = 365
rate_limit_sleep_time = 0.5
start_date = "1900-01-01"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = EtlConfig::from_toml_str(BASIC_CONFIG).unwrap();

        assert_eq!(config.faker.import_data_size, 30000);
        assert_eq!(config.date_interval(), 365);
        assert_eq!(config.start_date(), "1900-01-01");
        assert_eq!(config.persons_url(), "https://fakerapi.it/api/v2/persons");
        assert_eq!(config.rate_limit(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let config = EtlConfig::from_toml_str(BASIC_CONFIG).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.table_name(), "df_anonymized_persons");
    }

    #[test]
    fn test_optional_sections_override_defaults() {
        let content = format!(
            "{}\n[http]\ntimeout_seconds = 5\nretry_attempts = 1\nretry_delay_seconds = 0.25\n\n[analysis]\ntable_name = \"persons\"\n",
            BASIC_CONFIG
        );
        let config = EtlConfig::from_toml_str(&content).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy {
                max_retries: 1,
                delay: Duration::from_millis(250),
            }
        );
        assert_eq!(config.table_name(), "persons");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PERSONS_ETL_TEST_BASE_URL", "https://faker.test/api");

        let content = BASIC_CONFIG.replace(
            "https://fakerapi.it/api/v2",
            "${PERSONS_ETL_TEST_BASE_URL}",
        );
        let config = EtlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.faker.base_url, "https://faker.test/api");

        std::env::remove_var("PERSONS_ETL_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = BASIC_CONFIG.replace("https://fakerapi.it/api/v2", "invalid-url");
        assert!(EtlConfig::from_toml_str(&invalid_url).unwrap().validate().is_err());

        let zero_interval = BASIC_CONFIG.replace("date_interval = 365", "date_interval = 0");
        assert!(EtlConfig::from_toml_str(&zero_interval).unwrap().validate().is_err());

        let bad_date = BASIC_CONFIG.replace("1900-01-01", "01/01/1900");
        assert!(EtlConfig::from_toml_str(&bad_date).unwrap().validate().is_err());

        let negative_sleep =
            BASIC_CONFIG.replace("rate_limit_sleep_time = 0.5", "rate_limit_sleep_time = -1.0");
        assert!(EtlConfig::from_toml_str(&negative_sleep).unwrap().validate().is_err());
    }

    #[test]
    fn test_missing_required_field_fails_to_parse() {
        let content = BASIC_CONFIG.replace("import_data_size = 30000\n", "");
        assert!(matches!(
            EtlConfig::from_toml_str(&content),
            Err(EtlError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_CONFIG.as_bytes()).unwrap();

        let config = EtlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.faker.base_url, "https://fakerapi.it/api/v2");
    }
}

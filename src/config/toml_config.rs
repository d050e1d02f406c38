use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 程序啟動時建立一次的設定，之後以參考傳入各元件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub verifier: VerifierConfig,
    pub sheets: SheetsConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default = "default_sheets_endpoint")]
    pub endpoint: String,
    pub spreadsheet_id: String,
    pub access_token: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub upload_dir: String,
    #[serde(default = "default_email_column")]
    pub email_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_sheets_endpoint() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_email_column() -> String {
    "email".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl AppConfig {
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

    /// 替換環境變數 (例如 ${VERIFIER_API_KEY})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("verifier.endpoint", &self.verifier.endpoint)?;
        validation::validate_non_empty_string("verifier.api_key", &self.verifier.api_key)?;
        if let Some(timeout) = self.verifier.timeout_seconds {
            validation::validate_positive_number("verifier.timeout_seconds", timeout, 1)?;
        }

        validation::validate_url("sheets.endpoint", &self.sheets.endpoint)?;
        validation::validate_non_empty_string("sheets.spreadsheet_id", &self.sheets.spreadsheet_id)?;
        validation::validate_non_empty_string("sheets.access_token", &self.sheets.access_token)?;
        if let Some(timeout) = self.sheets.timeout_seconds {
            validation::validate_positive_number("sheets.timeout_seconds", timeout, 1)?;
        }

        validation::validate_path("input.upload_dir", &self.input.upload_dir)?;
        validation::validate_non_empty_string("input.email_column", &self.input.email_column)?;
        validation::validate_delimiter("input.delimiter", &self.input.delimiter)?;

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn verifier_endpoint(&self) -> &str {
        &self.verifier.endpoint
    }

    fn api_key(&self) -> &str {
        &self.verifier.api_key
    }

    fn sheets_endpoint(&self) -> &str {
        &self.sheets.endpoint
    }

    fn spreadsheet_id(&self) -> &str {
        &self.sheets.spreadsheet_id
    }

    fn access_token(&self) -> &str {
        &self.sheets.access_token
    }

    fn upload_dir(&self) -> &str {
        &self.input.upload_dir
    }

    fn email_column(&self) -> &str {
        &self.input.email_column
    }

    fn delimiter(&self) -> u8 {
        // 驗證過的設定只會是單一 ASCII 字元
        self.input.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[verifier]
endpoint = "https://verify.example.com"
api_key = "key-123"

[sheets]
spreadsheet_id = "sheet-abc"
access_token = "token-xyz"

[input]
upload_dir = "./uploads"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = AppConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.verifier.endpoint, "https://verify.example.com");
        assert_eq!(config.sheets.endpoint, "https://sheets.googleapis.com");
        assert_eq!(config.email_column(), "email");
        assert_eq!(config.delimiter(), b',');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MAIL_VERIFY_TEST_API_KEY", "from-env");

        let toml_content = BASIC.replace("key-123", "${MAIL_VERIFY_TEST_API_KEY}");
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.api_key(), "from-env");

        std::env::remove_var("MAIL_VERIFY_TEST_API_KEY");
    }

    #[test]
    fn test_unresolved_placeholder_is_kept() {
        let toml_content = BASIC.replace("key-123", "${MAIL_VERIFY_DEFINITELY_UNSET}");
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.api_key(), "${MAIL_VERIFY_DEFINITELY_UNSET}");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = BASIC.replace("https://verify.example.com", "invalid-url");
        let config = AppConfig::from_toml_str(&bad_url).unwrap();
        assert!(config.validate().is_err());

        let tab_delimited = format!("{}delimiter = \"\\t\"\n", BASIC);
        let config = AppConfig::from_toml_str(&tab_delimited).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.delimiter(), b'\t');

        let empty_token = BASIC.replace("token-xyz", "");
        let config = AppConfig::from_toml_str(&empty_token).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let err = AppConfig::from_toml_str("[verifier]\nendpoint = \"x\"\n").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.spreadsheet_id(), "sheet-abc");
    }
}

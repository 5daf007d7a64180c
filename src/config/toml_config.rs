use crate::core::generator::DEFAULT_WORDLIST;
use crate::core::ledger::{LedgerFiles, DEFAULT_AVAILABLE_FILE, DEFAULT_CHECKED_FILE};
use crate::domain::model::{GenerationStrategy, MAX_THROUGHPUT, MIN_THROUGHPUT};
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{
    validate_file_name, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, validate_wordlist, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub authority: AuthorityConfig,
    pub scan: ScanConfig,
    pub ledger: LedgerConfig,
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    pub endpoint: String,
    pub context: String,
    pub birthday: String,
    /// 存放 session token 的環境變數名稱
    pub token_env: String,
    pub cookie_name: String,
    pub timeout_seconds: u64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://auth.roblox.com/v1/usernames/validate".to_string(),
            context: "Signup".to_string(),
            birthday: "2000-01-01".to_string(),
            token_env: "ROBLOX_COOKIE".to_string(),
            cookie_name: ".ROBLOSECURITY".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub throughput: i64,
    pub strategy: GenerationStrategy,
    pub cooldown_seconds: u64,
    pub idle_poll_ms: u64,
    pub autostart: bool,
    pub wordlist: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            throughput: 1,
            strategy: GenerationStrategy::Random,
            cooldown_seconds: 30,
            idle_poll_ms: 500,
            autostart: false,
            wordlist: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub directory: String,
    pub checked_file: String,
    pub available_file: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            checked_file: DEFAULT_CHECKED_FILE.to_string(),
            available_file: DEFAULT_AVAILABLE_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enabled: bool,
    pub commit_message: String,
    pub push: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            commit_message: "Auto: sync logs and data".to_string(),
            push: true,
        }
    }
}

impl ScoutConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用內建預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::info!(
                "No config file at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScoutError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LEDGER_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScoutError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn ledger_files(&self) -> LedgerFiles {
        LedgerFiles {
            checked: self.ledger.checked_file.clone(),
            available: self.ledger.available_file.clone(),
        }
    }

    pub fn wordlist(&self) -> Vec<String> {
        self.scan
            .wordlist
            .clone()
            .unwrap_or_else(|| DEFAULT_WORDLIST.iter().map(|w| w.to_string()).collect())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.scan.cooldown_seconds)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.scan.idle_poll_ms)
    }
}

impl Validate for ScoutConfig {
    fn validate(&self) -> Result<()> {
        validate_url("authority.endpoint", &self.authority.endpoint)?;
        validate_non_empty_string("authority.context", &self.authority.context)?;
        validate_non_empty_string("authority.token_env", &self.authority.token_env)?;
        validate_positive_number("authority.timeout_seconds", self.authority.timeout_seconds, 1)?;

        validate_range(
            "scan.throughput",
            self.scan.throughput,
            i64::from(MIN_THROUGHPUT),
            i64::from(MAX_THROUGHPUT),
        )?;
        validate_positive_number("scan.cooldown_seconds", self.scan.cooldown_seconds, 1)?;
        validate_positive_number("scan.idle_poll_ms", self.scan.idle_poll_ms, 1)?;
        if let Some(words) = &self.scan.wordlist {
            validate_wordlist("scan.wordlist", words)?;
        }

        validate_path("ledger.directory", &self.ledger.directory)?;
        validate_file_name("ledger.checked_file", &self.ledger.checked_file)?;
        validate_file_name("ledger.available_file", &self.ledger.available_file)?;
        if self.ledger.checked_file == self.ledger.available_file {
            return Err(ScoutError::InvalidConfigValueError {
                field: "ledger.available_file".to_string(),
                value: self.ledger.available_file.clone(),
                reason: "Must differ from ledger.checked_file".to_string(),
            });
        }

        if self.backup.enabled {
            validate_non_empty_string("backup.commit_message", &self.backup.commit_message)?;
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
[authority]
endpoint = "https://validator.example.com/v1/validate"
context = "Signup"
timeout_seconds = 5

[scan]
throughput = 4
strategy = "hybrid"
cooldown_seconds = 45
wordlist = ["star", "moon"]

[ledger]
directory = "./data"
checked_file = "checked.txt"
available_file = "available.txt"

[backup]
enabled = true
push = false
"#;

        let config = ScoutConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.authority.endpoint, "https://validator.example.com/v1/validate");
        assert_eq!(config.authority.birthday, "2000-01-01");
        assert_eq!(config.scan.throughput, 4);
        assert_eq!(config.scan.strategy, GenerationStrategy::Hybrid);
        assert_eq!(config.cooldown(), Duration::from_secs(45));
        assert_eq!(config.wordlist(), vec!["star", "moon"]);
        assert_eq!(config.ledger_files().checked, "checked.txt");
        assert!(config.backup.enabled);
        assert!(!config.backup.push);
        assert_eq!(config.backup.commit_message, "Auto: sync logs and data");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ScoutConfig::from_toml_str("").unwrap();

        assert_eq!(config.scan.throughput, 1);
        assert_eq!(config.scan.strategy, GenerationStrategy::Random);
        assert_eq!(config.cooldown(), Duration::from_secs(30));
        assert_eq!(config.idle_poll(), Duration::from_millis(500));
        assert_eq!(config.ledger_files(), LedgerFiles::default());
        assert_eq!(config.wordlist().len(), DEFAULT_WORDLIST.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("NAME_SCOUT_TEST_LEDGER_DIR", "/var/lib/scout");

        let toml_content = r#"
[ledger]
directory = "${NAME_SCOUT_TEST_LEDGER_DIR}"
"#;

        let config = ScoutConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.ledger.directory, "/var/lib/scout");

        std::env::remove_var("NAME_SCOUT_TEST_LEDGER_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = ScoutConfig::from_toml_str(
            r#"
[authority]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(bad_endpoint.validate().is_err());

        let bad_throughput = ScoutConfig::from_toml_str("[scan]\nthroughput = 50\n").unwrap();
        assert!(bad_throughput.validate().is_err());

        let same_files = ScoutConfig::from_toml_str(
            r#"
[ledger]
checked_file = "names.txt"
available_file = "names.txt"
"#,
        )
        .unwrap();
        assert!(same_files.validate().is_err());

        let bad_words = ScoutConfig::from_toml_str("[scan]\nwordlist = [\"Hello World\"]\n").unwrap();
        assert!(bad_words.validate().is_err());
    }

    #[test]
    fn test_unknown_strategy_is_parse_error() {
        let result = ScoutConfig::from_toml_str("[scan]\nstrategy = \"leet\"\n");
        assert!(matches!(result, Err(ScoutError::ConfigError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[scan]\nthroughput = 7\nautostart = true\n")
            .unwrap();

        let config = ScoutConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.scan.throughput, 7);
        assert!(config.scan.autostart);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ScoutConfig::load_or_default("/nonexistent/name-scout.toml").unwrap();
        assert_eq!(config.scan.throughput, 1);
    }
}

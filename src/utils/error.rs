use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Ledger I/O failed for {}: {source}", .path.display())]
    LedgerError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Backup sync failed: {message}")]
    BackupError { message: String },
}

impl ScoutError {
    /// 給操作人員的處理建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScoutError::HttpError(_) => "Check network connectivity and the authority endpoint",
            ScoutError::IoError(_) | ScoutError::LedgerError { .. } => {
                "Check that the ledger directory exists and is writable"
            }
            ScoutError::SerializationError(_) => "Check the command/event JSON shape",
            ScoutError::ConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line overrides"
            }
            ScoutError::BackupError { .. } => {
                "Check the git remote and credentials; scanning continues without backup"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;

/// 單次可用性檢查失敗的分類。全部都不是致命錯誤。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    /// 網路層失敗（連線、逾時）
    #[error("transport failure: {0}")]
    Transport(String),

    /// 非 2xx 或無法解析的回應
    #[error("protocol failure: {0}")]
    Protocol(String),

    /// HTTP 429
    #[error("rate limited by authority (HTTP 429)")]
    RateLimited,
}

impl CheckFailure {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CheckFailure::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_classification() {
        assert!(CheckFailure::RateLimited.is_rate_limited());
        assert!(!CheckFailure::Transport("timeout".into()).is_rate_limited());
        assert!(!CheckFailure::Protocol("HTTP 500".into()).is_rate_limited());
    }

    #[test]
    fn test_error_display() {
        let err = ScoutError::InvalidConfigValueError {
            field: "scan.throughput".to_string(),
            value: "0".to_string(),
            reason: "Value must be between 1 and 20".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value '0' for scan.throughput: Value must be between 1 and 20"
        );
        assert!(!err.recovery_suggestion().is_empty());
    }
}

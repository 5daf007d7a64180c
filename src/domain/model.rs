use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 待檢查的候選名稱。不含換行，可直接逐行寫入 ledger。
pub type Identifier = String;

pub const MIN_THROUGHPUT: u8 = 1;
pub const MAX_THROUGHPUT: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStrategy {
    #[default]
    Random,
    Dictionary,
    Hybrid,
}

impl GenerationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStrategy::Random => "random",
            GenerationStrategy::Dictionary => "dictionary",
            GenerationStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(GenerationStrategy::Random),
            "dictionary" => Ok(GenerationStrategy::Dictionary),
            "hybrid" => Ok(GenerationStrategy::Hybrid),
            other => Err(format!("unknown generation strategy: {}", other)),
        }
    }
}

/// 驗證端點回傳內容的三分類
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorityVerdict {
    Valid,
    InUse,
    Unrecognized(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Available,
    Taken,
    /// 無法判定：未知回應（帶原始 payload）或檢查失敗（raw 為 None）
    Indeterminate {
        reason: String,
        raw: Option<serde_json::Value>,
    },
}

impl CheckOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, CheckOutcome::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl ErrorEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidEntry {
    pub identifier: Identifier,
    pub reason: String,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Idle,
    Running,
    Recovering,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub running: bool,
    pub status_message: String,
    pub throughput: u8,
    pub strategy: GenerationStrategy,
    pub recovering: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            running: false,
            status_message: "Idle".to_string(),
            throughput: MIN_THROUGHPUT,
            strategy: GenerationStrategy::Random,
            recovering: false,
        }
    }
}

impl RunState {
    pub fn clamp_throughput(requested: i64) -> u8 {
        requested.clamp(MIN_THROUGHPUT as i64, MAX_THROUGHPUT as i64) as u8
    }

    pub fn set_throughput(&mut self, requested: i64) -> u8 {
        self.throughput = Self::clamp_throughput(requested);
        self.throughput
    }

    pub fn phase(&self) -> ScanPhase {
        match (self.running, self.recovering) {
            (true, true) => ScanPhase::Recovering,
            (true, false) => ScanPhase::Running,
            (false, _) => ScanPhase::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// 以 `\n` 串接
    #[serde(alias = "txt")]
    Plain,
    /// 以 `,` 串接
    #[serde(alias = "csv")]
    Delimited,
}

impl ExportFormat {
    pub fn separator(&self) -> &'static str {
        match self {
            ExportFormat::Plain => "\n",
            ExportFormat::Delimited => ",",
        }
    }

    pub fn render(&self, identifiers: &[Identifier]) -> String {
        identifiers.join(self.separator())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "txt" => Ok(ExportFormat::Plain),
            "delimited" | "csv" => Ok(ExportFormat::Delimited),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// 對外公開的有界狀態快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub running: bool,
    pub phase: ScanPhase,
    pub status_message: String,
    pub throughput: u8,
    pub strategy: GenerationStrategy,
    /// 最新的在前
    pub available: Vec<Identifier>,
    pub errors: Vec<ErrorEntry>,
    pub voids: Vec<VoidEntry>,
    pub checked_count: usize,
    pub available_count: usize,
}

/// 推送給觀察者的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ScanEvent {
    Init(Snapshot),
    Update(Snapshot),
    Status { status_message: String },
    Found { identifier: Identifier },
    Void { identifier: Identifier },
    Export { format: ExportFormat, blob: String },
}

/// 由外部 command surface 送入的指令。
///
/// `set_strategy` 與 `export` 的值保留為字串，未知值在處理時視為 no-op。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Start,
    Stop,
    Troubleshoot,
    SetThroughput { value: i64 },
    SetStrategy { value: String },
    Export { format: String },
}

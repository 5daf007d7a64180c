use crate::core::dedup::DedupStore;
use crate::core::state::SharedState;
use crate::domain::model::{CheckOutcome, Identifier};
use crate::domain::ports::LogStorage;
use crate::utils::error::Result;

pub const DEFAULT_CHECKED_FILE: &str = "checked_usernames.txt";
pub const DEFAULT_AVAILABLE_FILE: &str = "available_usernames.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFiles {
    pub checked: String,
    pub available: String,
}

impl Default for LedgerFiles {
    fn default() -> Self {
        Self {
            checked: DEFAULT_CHECKED_FILE.to_string(),
            available: DEFAULT_AVAILABLE_FILE.to_string(),
        }
    }
}

impl LedgerFiles {
    pub fn names(&self) -> [&str; 2] {
        [&self.checked, &self.available]
    }
}

/// 從 ledger 重建的記憶體狀態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rehydrated {
    pub dedup: DedupStore,
    pub available: Vec<Identifier>,
}

/// 兩個 append-only 檔案：checked 記錄所有送檢過的名稱，available 只記錄可用者。
pub struct ResultLedger<S: LogStorage> {
    storage: S,
    files: LedgerFiles,
    state: SharedState,
}

impl<S: LogStorage> ResultLedger<S> {
    pub fn new(storage: S, files: LedgerFiles, state: SharedState) -> Self {
        Self {
            storage,
            files,
            state,
        }
    }

    /// 讀取兩個檔案；不存在的檔案視為空
    pub async fn rehydrate(storage: &S, files: &LedgerFiles) -> Result<Rehydrated> {
        let checked = storage.read_lines(&files.checked).await?;
        let available = storage.read_lines(&files.available).await?;

        tracing::info!(
            "📂 Rehydrated ledger: {} checked, {} available",
            checked.len(),
            available.len()
        );

        Ok(Rehydrated {
            dedup: checked.into_iter().collect(),
            available,
        })
    }

    /// 記錄一次檢查結果。
    ///
    /// 名稱先進 dedup 集合，確保即使寫檔失敗也不會在本行程內重查；
    /// available 清單只在 available 檔案寫入成功後才更新，兩者保持一致。
    pub async fn record(&self, id: &Identifier, outcome: &CheckOutcome) -> Result<()> {
        self.state.with(|s| s.dedup.insert(id.clone()));

        self.storage.append_line(&self.files.checked, id).await?;

        if outcome.is_available() {
            self.storage.append_line(&self.files.available, id).await?;
            self.state.with(|s| s.available.push(id.clone()));
            tracing::info!("🎯 Available: {}", id);
        } else {
            tracing::debug!("Recorded {} as {:?}", id, outcome);
        }

        Ok(())
    }
}

//! 行程內唯一的掃描狀態。
//!
//! 所有欄位都放在同一個 `ScanState` 裡，由 `SharedState` 以 `std::sync::Mutex`
//! 保護。鎖只能透過 `SharedState::with` 的 closure 取得，因此不可能跨越
//! `.await` 持有。

use crate::core::dedup::DedupStore;
use crate::domain::model::{ErrorEntry, Identifier, RunState, Snapshot, VoidEntry};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const AVAILABLE_WINDOW: usize = 20;
pub const ERROR_WINDOW: usize = 20;
pub const VOID_WINDOW: usize = 10;

pub const STATUS_IDLE: &str = "Idle";
pub const STATUS_RUNNING: &str = "Running";
pub const STATUS_STOPPED: &str = "Stopped";

pub fn checking_status(id: &str) -> String {
    format!("Checking: {}", id)
}

pub fn recovering_status(cooldown: Duration) -> String {
    format!(
        "Recovering: rate limited, pausing for {}s",
        cooldown.as_secs()
    )
}

#[derive(Debug, Default)]
pub struct ScanState {
    pub run: RunState,
    pub dedup: DedupStore,
    /// 依寫入順序，與 available 檔案同步
    pub available: Vec<Identifier>,
    pub errors: Vec<ErrorEntry>,
    pub voids: Vec<VoidEntry>,
}

impl ScanState {
    pub fn rehydrated(dedup: DedupStore, available: Vec<Identifier>) -> Self {
        Self {
            dedup,
            available,
            ..Self::default()
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(ErrorEntry::now(message));
    }

    pub fn push_void(&mut self, entry: VoidEntry) {
        self.voids.push(entry);
    }

    /// 清空錯誤與 void 紀錄，狀態訊息回到目前的 running/idle。不改變 running。
    pub fn troubleshoot(&mut self) {
        self.errors.clear();
        self.voids.clear();
        self.run.status_message = self.resting_status().to_string();
    }

    pub fn resting_status(&self) -> &'static str {
        if self.run.running {
            STATUS_RUNNING
        } else {
            STATUS_IDLE
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            running: self.run.running,
            phase: self.run.phase(),
            status_message: self.run.status_message.clone(),
            throughput: self.run.throughput,
            strategy: self.run.strategy,
            available: self
                .available
                .iter()
                .rev()
                .take(AVAILABLE_WINDOW)
                .cloned()
                .collect(),
            errors: tail(&self.errors, ERROR_WINDOW).to_vec(),
            voids: tail(&self.voids, VOID_WINDOW).to_vec(),
            checked_count: self.dedup.len(),
            available_count: self.available.len(),
        }
    }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<ScanState>>,
}

impl SharedState {
    pub fn new(state: ScanState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ScanState) -> R) -> R {
        // 持鎖期間不會 panic 到半途，poison 時直接沿用內容
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with(|state| state.snapshot())
    }

    pub fn run_state(&self) -> RunState {
        self.with(|state| state.run.clone())
    }
}

//! 單元測試共用的替身實作
use crate::domain::model::AuthorityVerdict;
use crate::domain::ports::{AvailabilityAuthority, BackupSync, LogStorage};
use crate::utils::error::{CheckFailure, Result, ScoutError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Scripted = std::result::Result<AuthorityVerdict, CheckFailure>;

/// 依序回傳預先排好的結果，用完後一律回 InUse
#[derive(Default)]
pub struct ScriptedAuthority {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAuthority {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilityAuthority for ScriptedAuthority {
    async fn validate(&self, identifier: &str) -> Scripted {
        self.calls.lock().unwrap().push(identifier.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(AuthorityVerdict::InUse))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<String>>>>,
    fail_appends: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self, name: &str) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn seed(&self, name: &str, lines: &[&str]) {
        self.files.lock().unwrap().insert(
            name.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
    }

    pub fn fail_appends(&self, fail: bool) {
        *self.fail_appends.lock().unwrap() = fail;
    }
}

impl LogStorage for MemoryStorage {
    async fn read_lines(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.lines(name))
    }

    async fn append_line(&self, name: &str, line: &str) -> Result<()> {
        if *self.fail_appends.lock().unwrap() {
            return Err(ScoutError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("disk full: {}", name),
            )));
        }
        self.files
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(line.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingBackup {
    pub calls: AtomicUsize,
    pub fail: bool,
    /// 每次同步花費的時間
    pub delay: std::time::Duration,
}

impl CountingBackup {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackupSync for CountingBackup {
    async fn sync(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ScoutError::BackupError {
                message: "remote rejected push".to_string(),
            });
        }
        Ok(())
    }
}

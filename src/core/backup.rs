use crate::core::state::SharedState;
use crate::domain::ports::BackupSync;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const BACKUP_ERROR_PREFIX: &str = "Backup sync: ";

/// 排入備份請求的把手。佇列滿時直接丟棄：等待中的那次同步會涵蓋新寫入的行。
#[derive(Debug, Clone)]
pub struct BackupQueue {
    sender: mpsc::Sender<()>,
}

impl BackupQueue {
    pub fn request(&self) {
        if self.sender.try_send(()).is_err() {
            tracing::debug!("Backup already pending, coalescing request");
        }
    }
}

/// 啟動背景備份 worker。失敗只記錄，不影響掃描迴圈。
pub fn spawn_backup_worker(
    backup: Arc<dyn BackupSync>,
    state: SharedState,
    shutdown: CancellationToken,
) -> (BackupQueue, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<()>(1);

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                request = receiver.recv() => {
                    if request.is_none() {
                        break;
                    }
                    match backup.sync().await {
                        Ok(()) => tracing::debug!("☁️ Backup sync completed"),
                        Err(e) => {
                            tracing::warn!("☁️ Backup sync failed: {}", e);
                            state.with(|s| s.push_error(format!("{}{}", BACKUP_ERROR_PREFIX, e)));
                        }
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }
        tracing::debug!("Backup worker stopped");
    });

    (BackupQueue { sender }, handle)
}

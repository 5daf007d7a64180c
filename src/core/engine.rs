//! 掃描迴圈。
//!
//! 一次只會有一個外部檢查在進行。暫停點只有三個：外部檢查、429 冷卻、
//! 每輪的節流/閒置等待；每個等待都會同時監聽 shutdown token。

use crate::core::backup::BackupQueue;
use crate::core::checker::AvailabilityChecker;
use crate::core::events::EventBus;
use crate::core::generator::Generator;
use crate::core::ledger::ResultLedger;
use crate::core::state::{checking_status, SharedState};
use crate::domain::model::{CheckOutcome, Identifier, ScanEvent};
use crate::domain::ports::LogStorage;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_IDLE_POLL: Duration = Duration::from_millis(500);

/// 每輪的結果，主要給測試與日誌使用
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Idle,
    Skipped(Identifier),
    Checked(Identifier, CheckOutcome),
}

/// throughput 是每秒嘗試的名稱數，而不是成功檢查數
pub fn throttle_delay(throughput: u8) -> Duration {
    Duration::from_millis(1000 / u64::from(throughput.max(1)))
}

pub struct ScanEngine<S: LogStorage> {
    generator: Generator,
    checker: AvailabilityChecker,
    ledger: ResultLedger<S>,
    state: SharedState,
    events: EventBus,
    backup: Option<BackupQueue>,
    idle_poll: Duration,
    shutdown: CancellationToken,
}

impl<S: LogStorage> ScanEngine<S> {
    pub fn new(
        generator: Generator,
        checker: AvailabilityChecker,
        ledger: ResultLedger<S>,
        state: SharedState,
        events: EventBus,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            generator,
            checker,
            ledger,
            state,
            events,
            backup: None,
            idle_poll: DEFAULT_IDLE_POLL,
            shutdown,
        }
    }

    pub fn with_backup(mut self, backup: BackupQueue) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    /// 一直執行到 shutdown token 被取消
    pub async fn run(&self) {
        tracing::info!("🚀 Scan loop started");

        while !self.shutdown.is_cancelled() {
            let outcome = self.tick().await;

            let delay = match outcome {
                TickOutcome::Idle => self.idle_poll,
                _ => throttle_delay(self.state.with(|s| s.run.throughput)),
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.cancelled() => break,
            }

            self.events.publish(ScanEvent::Update(self.state.snapshot()));
        }

        tracing::info!("🛑 Scan loop stopped");
    }

    /// 執行一輪（不含節流等待）
    pub async fn tick(&self) -> TickOutcome {
        let run = self.state.run_state();
        if !run.running {
            return TickOutcome::Idle;
        }

        let id = self.generator.generate(run.strategy);
        if self.state.with(|s| s.dedup.contains(&id)) {
            tracing::debug!("Skipping already checked {}", id);
            return TickOutcome::Skipped(id);
        }

        tracing::debug!("🔎 Checking {}", id);
        self.events.publish(ScanEvent::Status {
            status_message: checking_status(&id),
        });

        let outcome = self.checker.check(&id).await;

        let recorded = match self.ledger.record(&id, &outcome).await {
            Ok(()) => {
                if let Some(backup) = &self.backup {
                    backup.request();
                }
                true
            }
            Err(e) => {
                tracing::error!("❌ Failed to record {}: {}", id, e);
                self.state
                    .with(|s| s.push_error(format!("Ledger: {}", e)));
                false
            }
        };

        // found 只在名稱已寫入 available 檔之後發送
        match &outcome {
            CheckOutcome::Available if recorded => self.events.publish(ScanEvent::Found {
                identifier: id.clone(),
            }),
            CheckOutcome::Available => {}
            CheckOutcome::Indeterminate { .. } => self.events.publish(ScanEvent::Void {
                identifier: id.clone(),
            }),
            CheckOutcome::Taken => {}
        }

        TickOutcome::Checked(id, outcome)
    }
}

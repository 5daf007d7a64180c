use crate::core::events::EventBus;
use crate::core::state::{recovering_status, SharedState, STATUS_RUNNING};
use crate::domain::model::{AuthorityVerdict, CheckOutcome, Identifier, ScanEvent, VoidEntry};
use crate::domain::ports::AvailabilityAuthority;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

pub const UNEXPECTED_RESPONSE: &str = "Unexpected API response";

/// 包裝外部驗證端點：分類結果、記錄錯誤與 void，遇到 429 時進入冷卻。
pub struct AvailabilityChecker {
    authority: Arc<dyn AvailabilityAuthority>,
    state: SharedState,
    events: EventBus,
    cooldown: Duration,
    shutdown: CancellationToken,
}

impl AvailabilityChecker {
    pub fn new(
        authority: Arc<dyn AvailabilityAuthority>,
        state: SharedState,
        events: EventBus,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            authority,
            state,
            events,
            cooldown: DEFAULT_COOLDOWN,
            shutdown,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub async fn check(&self, id: &Identifier) -> CheckOutcome {
        match self.authority.validate(id).await {
            Ok(AuthorityVerdict::Valid) => CheckOutcome::Available,
            Ok(AuthorityVerdict::InUse) => CheckOutcome::Taken,
            Ok(AuthorityVerdict::Unrecognized(raw)) => {
                tracing::warn!("🕳️ Unclassified response for {}: {}", id, raw);
                self.state.with(|s| {
                    s.push_void(VoidEntry {
                        identifier: id.clone(),
                        reason: UNEXPECTED_RESPONSE.to_string(),
                        raw: raw.clone(),
                    })
                });
                CheckOutcome::Indeterminate {
                    reason: UNEXPECTED_RESPONSE.to_string(),
                    raw: Some(raw),
                }
            }
            Err(failure) => {
                tracing::warn!("⚠️ Check failed for {}: {}", id, failure);
                let message = failure.to_string();
                self.state.with(|s| s.push_error(message.clone()));

                if failure.is_rate_limited() {
                    self.recover().await;
                }

                CheckOutcome::Indeterminate {
                    reason: message,
                    raw: None,
                }
            }
        }
    }

    /// 冷卻期間只擋住掃描迴圈；指令處理照常，因為這裡沒有持有任何鎖。
    async fn recover(&self) {
        let status = recovering_status(self.cooldown);
        tracing::warn!("🩹 {}", status);
        self.state.with(|s| {
            s.run.recovering = true;
            s.run.status_message = status.clone();
        });
        self.events.publish(ScanEvent::Status {
            status_message: status,
        });

        tokio::select! {
            _ = tokio::time::sleep(self.cooldown) => {}
            _ = self.shutdown.cancelled() => {
                tracing::debug!("Cooldown interrupted by shutdown");
            }
        }

        // 冷卻中收到 stop 時保留 "Stopped"，不強制回到 Running
        let status = self.state.with(|s| {
            s.run.recovering = false;
            if s.run.running {
                s.run.status_message = STATUS_RUNNING.to_string();
            }
            s.run.status_message.clone()
        });
        tracing::info!("✅ Cooldown finished, status: {}", status);
        self.events.publish(ScanEvent::Status {
            status_message: status,
        });
    }
}

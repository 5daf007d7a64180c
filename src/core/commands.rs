use crate::core::events::EventBus;
use crate::core::state::{SharedState, STATUS_RUNNING, STATUS_STOPPED};
use crate::domain::model::{Command, ExportFormat, GenerationStrategy, ScanEvent};

/// 指令入口：只修改共享狀態，不碰掃描迴圈內正在進行的檢查。
#[derive(Debug, Clone)]
pub struct CommandSurface {
    state: SharedState,
    events: EventBus,
}

impl CommandSurface {
    pub fn new(state: SharedState, events: EventBus) -> Self {
        Self { state, events }
    }

    /// 新觀察者連上時送出的完整快照
    pub fn init_event(&self) -> ScanEvent {
        ScanEvent::Init(self.state.snapshot())
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// 套用指令。只有 export 會回傳給發送者的事件，其餘變更由下一次 update 反映。
    pub fn handle(&self, command: Command) -> Option<ScanEvent> {
        match command {
            Command::Start => {
                self.state.with(|s| {
                    s.run.running = true;
                    // 冷卻中保留 recovering 訊息，冷卻結束後自然回到 Running
                    if !s.run.recovering {
                        s.run.status_message = STATUS_RUNNING.to_string();
                    }
                });
                tracing::info!("▶️ Scanner started");
                None
            }
            Command::Stop => {
                self.state.with(|s| {
                    s.run.running = false;
                    s.run.status_message = STATUS_STOPPED.to_string();
                });
                tracing::info!("⏹️ Scanner stopped");
                None
            }
            Command::Troubleshoot => {
                self.state.with(|s| s.troubleshoot());
                tracing::info!("🛠️ Error and void logs cleared");
                None
            }
            Command::SetThroughput { value } => {
                let effective = self.state.with(|s| s.run.set_throughput(value));
                if i64::from(effective) != value {
                    tracing::warn!("Throughput {} clamped to {}", value, effective);
                }
                tracing::info!("⚙️ Throughput set to {}/s", effective);
                None
            }
            Command::SetStrategy { value } => {
                match value.parse::<GenerationStrategy>() {
                    Ok(strategy) => {
                        self.state.with(|s| s.run.strategy = strategy);
                        tracing::info!("🎲 Strategy set to {}", strategy);
                    }
                    Err(e) => tracing::warn!("Ignoring set_strategy: {}", e),
                }
                None
            }
            Command::Export { format } => match format.parse::<ExportFormat>() {
                Ok(format) => {
                    let blob = self.export(format);
                    Some(ScanEvent::Export { format, blob })
                }
                Err(e) => {
                    tracing::warn!("Ignoring export: {}", e);
                    None
                }
            },
        }
    }

    pub fn export(&self, format: ExportFormat) -> String {
        self.state.with(|s| format.render(&s.available))
    }
}

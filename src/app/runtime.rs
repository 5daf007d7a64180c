use crate::adapters::backup::GitBackup;
use crate::adapters::http::HttpAuthority;
use crate::adapters::storage::LocalStorage;
use crate::config::toml_config::ScoutConfig;
use crate::core::backup::spawn_backup_worker;
use crate::core::checker::AvailabilityChecker;
use crate::core::commands::CommandSurface;
use crate::core::engine::ScanEngine;
use crate::core::events::EventBus;
use crate::core::generator::Generator;
use crate::core::ledger::ResultLedger;
use crate::core::state::{ScanState, SharedState, STATUS_RUNNING};
use crate::domain::model::RunState;
use crate::domain::ports::AvailabilityAuthority;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 組裝好的掃描服務：引擎、指令入口與背景備份
pub struct ScoutRuntime {
    engine: Arc<ScanEngine<LocalStorage>>,
    commands: CommandSurface,
    state: SharedState,
    events: EventBus,
    backup_task: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl ScoutRuntime {
    pub async fn from_config(config: &ScoutConfig, shutdown: CancellationToken) -> Result<Self> {
        let authority = Arc::new(HttpAuthority::from_config(&config.authority)?);
        Self::bootstrap(config, authority, shutdown).await
    }

    /// 重建 ledger 狀態並組裝各元件；authority 可替換以便測試
    pub async fn bootstrap(
        config: &ScoutConfig,
        authority: Arc<dyn AvailabilityAuthority>,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let storage = LocalStorage::new(&config.ledger.directory);
        let files = config.ledger_files();
        let rehydrated = ResultLedger::rehydrate(&storage, &files).await?;

        let mut scan_state = ScanState::rehydrated(rehydrated.dedup, rehydrated.available);
        scan_state.run = RunState {
            strategy: config.scan.strategy,
            ..RunState::default()
        };
        scan_state.run.set_throughput(config.scan.throughput);
        if config.scan.autostart {
            scan_state.run.running = true;
            scan_state.run.status_message = STATUS_RUNNING.to_string();
        }

        let state = SharedState::new(scan_state);
        let events = EventBus::default();

        let checker = AvailabilityChecker::new(
            authority,
            state.clone(),
            events.clone(),
            shutdown.clone(),
        )
        .with_cooldown(config.cooldown());
        let ledger = ResultLedger::new(storage.clone(), files.clone(), state.clone());

        let mut engine = ScanEngine::new(
            Generator::new(config.wordlist()),
            checker,
            ledger,
            state.clone(),
            events.clone(),
            shutdown.clone(),
        )
        .with_idle_poll(config.idle_poll());

        let backup_task = if config.backup.enabled {
            let backup = GitBackup::new(
                storage.base_path(),
                files.names().iter().map(|f| f.to_string()).collect(),
                config.backup.commit_message.clone(),
                config.backup.push,
            );
            let (queue, handle) =
                spawn_backup_worker(Arc::new(backup), state.clone(), shutdown.clone());
            engine = engine.with_backup(queue);
            tracing::info!("☁️ Git backup enabled for {}", storage.base_path().display());
            Some(handle)
        } else {
            None
        };

        Ok(Self {
            engine: Arc::new(engine),
            commands: CommandSurface::new(state.clone(), events.clone()),
            state,
            events,
            backup_task,
            shutdown,
        })
    }

    pub fn commands(&self) -> CommandSurface {
        self.commands.clone()
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn spawn_engine(&self) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move { engine.run().await })
    }

    /// 取消 token 並等待背景備份結束
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Some(handle) = self.backup_task {
            if let Err(e) = handle.await {
                tracing::warn!("Backup worker ended abnormally: {}", e);
            }
        }
    }
}

use anyhow::Context;
use clap::Parser;
use name_scout::adapters::console::run_console;
use name_scout::utils::{logger, validation::Validate};
use name_scout::{CliArgs, ScoutConfig, ScoutRuntime};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting name-scout");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = ScoutConfig::load_or_default(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if args.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    let shutdown = CancellationToken::new();
    let runtime = ScoutRuntime::from_config(&config, shutdown.clone())
        .await
        .context("failed to initialise scanner")?;

    let engine_task = runtime.spawn_engine();
    let console_task = {
        let commands = runtime.commands();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            run_console(
                commands,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                shutdown,
            )
            .await
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("🛑 Shutdown requested");
    shutdown.cancel();

    if let Err(e) = engine_task.await {
        tracing::error!("Scan loop ended abnormally: {}", e);
    }
    match console_task.await {
        Ok(Err(e)) => tracing::warn!("Console surface ended with error: {}", e),
        Err(e) => tracing::warn!("Console surface ended abnormally: {}", e),
        Ok(Ok(())) => {}
    }
    runtime.shutdown().await;

    tracing::info!("✅ name-scout stopped");
    // stdin 的阻塞讀取會讓 runtime 關閉時一直等到下一行輸入
    std::process::exit(0);
}

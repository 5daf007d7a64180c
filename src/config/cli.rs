use crate::config::toml_config::ScoutConfig;
use crate::domain::model::GenerationStrategy;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "name-scout")]
#[command(about = "Continuously generate candidate names and check their availability")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "name-scout.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Start scanning immediately instead of waiting for a start command
    #[arg(long)]
    pub autostart: bool,

    /// Override scan.throughput (names per second, clamped to 1-20)
    #[arg(long)]
    pub throughput: Option<i64>,

    /// Override scan.strategy
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<GenerationStrategy>,

    /// Override ledger.directory
    #[arg(long)]
    pub ledger_dir: Option<String>,
}

fn parse_strategy(value: &str) -> Result<GenerationStrategy, String> {
    value.parse()
}

impl CliArgs {
    /// 命令列參數優先於設定檔
    pub fn apply_overrides(&self, config: &mut ScoutConfig) {
        if self.autostart {
            config.scan.autostart = true;
        }
        if let Some(throughput) = self.throughput {
            config.scan.throughput = throughput;
            tracing::info!("🔧 Throughput overridden to: {}", throughput);
        }
        if let Some(strategy) = self.strategy {
            config.scan.strategy = strategy;
            tracing::info!("🔧 Strategy overridden to: {}", strategy);
        }
        if let Some(dir) = &self.ledger_dir {
            config.ledger.directory = dir.clone();
            tracing::info!("🔧 Ledger directory overridden to: {}", dir);
        }
    }
}

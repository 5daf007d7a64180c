pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{http::HttpAuthority, storage::LocalStorage};
pub use app::ScoutRuntime;
pub use config::ScoutConfig;
pub use crate::core::{commands::CommandSurface, engine::ScanEngine};
pub use utils::error::{Result, ScoutError};

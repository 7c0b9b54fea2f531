pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use core::{etl::DashboardEngine, pipeline::DashboardPipeline};
pub use domain::model::{Dashboard, PanelSpec, Series};
pub use utils::error::{Result, WalletError};

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use app::{catalog_loader::JsonCatalogLoader, pipelines::ScanPipeline};
pub use core::{catalog::Catalog, engine::ScanEngine, resolver::recognize};
pub use utils::error::{LensError, Result};

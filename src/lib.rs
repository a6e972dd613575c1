pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::builtin::BuiltinCatalog;
pub use config::catalog_file::{CatalogFile, CatalogPath};
pub use core::tour::Tour;
pub use utils::error::{Result, TourError};
pub use utils::section::{log_section, Banner};

pub mod builtin;
pub mod catalog_file;

#[cfg(feature = "cli")]
use builtin::BuiltinCatalog;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "module-tour")]
#[command(about = "Print a colored tour of a front-end module catalog")]
pub struct CliConfig {
    /// Path to a TOML catalog; takes precedence over --example
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Built-in catalog to show
    #[arg(long, value_enum, default_value = "dependencies")]
    pub example: BuiltinCatalog,

    /// Only show these modules (repeatable or comma-separated)
    #[arg(long = "module", value_delimiter = ',')]
    pub modules: Vec<String>,

    /// Run the catalog checks and print diagnostics only
    #[arg(long)]
    pub check: bool,

    /// Print a JSON summary instead of banners
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,
}

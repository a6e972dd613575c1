use crate::config::catalog_file::CatalogFile;
use crate::domain::model::Catalog;
use crate::domain::ports::CatalogSource;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

const ARCHITECTURE: &str = include_str!("../../catalogs/architecture.toml");
const DEPENDENCIES: &str = include_str!("../../catalogs/dependencies.toml");

/// Catalogs compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum BuiltinCatalog {
    /// One feature module in detail
    Architecture,
    /// Root, core, shared, feature and routing modules together
    Dependencies,
}

impl BuiltinCatalog {
    pub fn all() -> [BuiltinCatalog; 2] {
        [BuiltinCatalog::Architecture, BuiltinCatalog::Dependencies]
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinCatalog::Architecture => "architecture",
            BuiltinCatalog::Dependencies => "dependencies",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            BuiltinCatalog::Architecture => ARCHITECTURE,
            BuiltinCatalog::Dependencies => DEPENDENCIES,
        }
    }

    pub fn load(self) -> Result<Catalog> {
        let file = CatalogFile::from_toml_str(self.source())?;
        file.validate()?;
        file.into_catalog()
    }
}

impl CatalogSource for BuiltinCatalog {
    fn describe(&self) -> String {
        format!("built-in '{}' catalog", self.name())
    }

    fn load_catalog(&self) -> Result<Catalog> {
        self.load()
    }
}

use crate::domain::model::Catalog;
use crate::utils::error::Result;

/// Anything the tour can read a catalog from.
pub trait CatalogSource {
    /// Short label used in logs.
    fn describe(&self) -> String;
    fn load_catalog(&self) -> Result<Catalog>;
}

pub mod checks;
pub mod graph;
pub mod scope;
pub mod tour;

pub use crate::domain::model::{Catalog, Diagnostic, ModuleDescriptor};
pub use crate::domain::ports::CatalogSource;
pub use crate::utils::error::Result;

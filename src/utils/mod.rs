pub mod error;
pub mod logger;
pub mod section;
pub mod validation;

use crate::domain::model::{Diagnostic, Severity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TourError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Import cycle: {}", path.join(" -> "))]
    ImportCycle { path: Vec<String> },

    #[error("Catalog has {} error(s)", count_errors(diagnostics))]
    CatalogInvalid { diagnostics: Vec<Diagnostic> },
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

impl TourError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            TourError::IoError(e) => format!("Could not read the catalog file: {}", e),
            TourError::ConfigError { message } => format!("The catalog could not be loaded: {}", message),
            TourError::InvalidConfigValueError { field, reason, .. } => {
                format!("'{}' is not valid: {}", field, reason)
            }
            TourError::ImportCycle { path } => {
                format!("Modules import each other in a loop: {}", path.join(" -> "))
            }
            TourError::CatalogInvalid { diagnostics } => {
                let mut message = format!(
                    "The catalog breaks {} module rule(s):",
                    count_errors(diagnostics)
                );
                for diagnostic in diagnostics.iter().filter(|d| d.severity == Severity::Error) {
                    message.push_str(&format!("\n  - {}", diagnostic));
                }
                message
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TourError::IoError(_) => "Check that the --catalog path exists and is readable",
            TourError::SerializationError(_) => "Re-run without --json to see the plain report",
            TourError::ConfigError { .. } => "Check the TOML syntax and the field names of the catalog",
            TourError::InvalidConfigValueError { .. } => "Fix the reported field in the catalog file",
            TourError::ImportCycle { .. } => "Move the shared pieces into a module both sides can import",
            TourError::CatalogInvalid { .. } => "Run with --check to list every diagnostic",
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            TourError::ImportCycle { .. } | TourError::CatalogInvalid { .. } => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TourError>;

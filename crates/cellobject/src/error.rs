//! Error types for the collection layer.

use crate::model::{CellId, IndexPath};

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for data model lookups and construction.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors that can occur anywhere in the collection layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Data model construction or lookup failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An edit batch could not be replayed.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Configuration could not be loaded or saved.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Data model errors.
///
/// Index errors are contract violations by the caller: they are reported, never
/// recovered from by substituting a default item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A section index beyond the model's section count.
    #[error("section {section} out of range (model has {count} sections)")]
    SectionOutOfRange { section: usize, count: usize },

    /// An index path that does not address an item.
    #[error("index path {path} out of range")]
    PathOutOfRange { path: IndexPath },

    /// The same cell identity was supplied twice.
    #[error("cell {id} appears at both {first} and {second}")]
    DuplicateIdentity {
        id: CellId,
        first: IndexPath,
        second: IndexPath,
    },

    /// The cell is not part of the model.
    #[error("cell {id} is not part of the model")]
    UnknownCell { id: CellId },
}

impl ModelError {
    /// Create a section range error.
    pub fn section_out_of_range(section: usize, count: usize) -> Self {
        Self::SectionOutOfRange { section, count }
    }

    /// Create a path range error.
    pub fn path_out_of_range(path: IndexPath) -> Self {
        Self::PathOutOfRange { path }
    }
}

/// Errors raised while replaying an edit batch against a render state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// An operation names a section the state does not have.
    #[error("{operation} references section {section}, but only {count} sections exist")]
    SectionOutOfRange {
        operation: &'static str,
        section: usize,
        count: usize,
    },

    /// An operation names an item position outside its section.
    #[error("{operation} references {path}, outside its section")]
    PathOutOfRange {
        operation: &'static str,
        path: IndexPath,
    },

    /// Two operations claim the same position.
    #[error("{path} is claimed by more than one {phase} operation")]
    Conflict { phase: &'static str, path: IndexPath },

    /// The batch leaves a different number of sections than the target has.
    #[error("expected {expected} sections after the batch, {available} available")]
    SectionCountMismatch { expected: usize, available: usize },

    /// After applying the batch a section still has unfilled positions.
    #[error("section {section} expected {expected} items after the batch, {available} available")]
    CountMismatch {
        section: usize,
        expected: usize,
        available: usize,
    },
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML input could not be parsed.
    #[error("invalid TOML configuration: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Configuration could not be written as TOML.
    #[error("failed to serialize configuration as TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON input could not be parsed or written.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file has neither a `.toml` nor a `.json` extension.
    #[error("unsupported configuration format: {path}")]
    UnsupportedFormat { path: std::path::PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::section_out_of_range(3, 2);
        assert_eq!(err.to_string(), "section 3 out of range (model has 2 sections)");

        let err = ModelError::path_out_of_range(IndexPath::new(0, 7));
        assert_eq!(err.to_string(), "index path [0, 7] out of range");
    }

    #[test]
    fn test_error_from_model_error() {
        let err: Error = ModelError::path_out_of_range(IndexPath::new(1, 1)).into();
        assert!(matches!(err, Error::Model(ModelError::PathOutOfRange { .. })));
    }
}

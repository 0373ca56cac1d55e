//! Error types for structural analysis and design checks

use thiserror::Error;

/// Main error type for model building, analysis and capacity checks
#[derive(Error, Debug)]
pub enum StructError {
    /// Invalid or incomplete input to the combination engine or the model builder
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Coincident nodes, zero-length members or a floating substructure
    #[error("Degenerate geometry at '{entity}': {detail}")]
    DegenerateGeometry { entity: String, detail: String },

    /// Singular or ill-conditioned stiffness matrix for a combination
    #[error("Unstable structure under combination '{combination}': {detail}")]
    Instability { combination: String, detail: String },

    /// A standards catalog miss
    #[error("No entry '{key}' in table '{table}' of {standard}")]
    Lookup {
        standard: String,
        table: String,
        key: String,
    },

    #[error("Node '{0}' not found in model")]
    NodeNotFound(String),

    #[error("Member '{0}' not found in model")]
    MemberNotFound(String),

    #[error("Material '{0}' not found in model")]
    MaterialNotFound(String),

    #[error("Section '{0}' not found in model")]
    SectionNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog format error: {0}")]
    CatalogFormat(#[from] serde_json::Error),
}

impl StructError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        StructError::Configuration(msg.into())
    }

    pub(crate) fn degenerate(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        StructError::DegenerateGeometry {
            entity: entity.into(),
            detail: detail.into(),
        }
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            StructError::Configuration(_) => "configuration",
            StructError::DegenerateGeometry { .. } => "degenerate_geometry",
            StructError::Instability { .. } => "instability",
            StructError::Lookup { .. } => "lookup",
            StructError::NodeNotFound(_)
            | StructError::MemberNotFound(_)
            | StructError::MaterialNotFound(_)
            | StructError::SectionNotFound(_)
            | StructError::DuplicateName(_) => "model",
            StructError::Io(_) | StructError::CatalogFormat(_) => "catalog",
        }
    }
}

/// Result type for structural operations
pub type StructResult<T> = Result<T, StructError>;

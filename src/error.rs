//! Error types for respack

use std::path::PathBuf;
use thiserror::Error;

/// Result type for resource pipeline operations
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Errors that can occur while building resources
#[derive(Error, Debug)]
pub enum ResourceError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic asset name is malformed (e.g. contains a variant separator)
    #[error("Invalid resource name: {0}")]
    InvalidName(String),

    /// More than one variant scored highest for a platform
    #[error(
        "Ambiguous variants for '{name}' on platform '{platform}' (score {score}): {}",
        .candidates.join(", ")
    )]
    AmbiguousVariant {
        /// Generic asset name being resolved
        name: String,
        /// Platform the resolution ran for
        platform: String,
        /// Shared maximum score
        score: usize,
        /// All candidates tied at `score`
        candidates: Vec<String>,
    },

    /// No generator is registered for the resource type
    #[error("Unsupported resource type '{resource_type}' for resource {name}")]
    UnsupportedResourceType {
        /// Resource name
        name: String,
        /// Type tag from the definition
        resource_type: String,
    },

    /// Source asset is missing or could not be decoded
    #[error("Failed to read source for {name} ({}): {reason}", .path.display())]
    SourceRead {
        /// Resource name
        name: String,
        /// Source path that failed
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// Stored CRC does not match the resource bytes
    #[error("CRC mismatch for resource {resource_id}: stored {expected:#010x}, computed {actual:#010x}")]
    Integrity {
        /// 1-based resource id
        resource_id: u32,
        /// CRC from the pack index
        expected: u32,
        /// CRC of the bytes found in the blob
        actual: u32,
    },

    /// Too many resources for the reader's index table
    #[error("Pack holds {count} resources, readers reserve only {max} index entries")]
    CapacityExceeded {
        /// Number of resources requested
        count: usize,
        /// Maximum index entries
        max: usize,
    },

    /// Resource name declared more than once
    #[error("Duplicate resource name: {0}")]
    DuplicateName(String),

    /// One or more resources failed to generate
    #[error("{} resource(s) failed to build:\n{}", .failures.len(), .failures.join("\n"))]
    MissingResources {
        /// One line per failed resource
        failures: Vec<String>,
    },

    /// Malformed or truncated pack file
    #[error("Invalid pack format: {0}")]
    InvalidPack(String),

    /// Invalid manifest or pipeline configuration
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

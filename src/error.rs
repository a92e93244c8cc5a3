//! Error types for the customization engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the pure preview/price computation.
///
/// Rendering and pricing never fail for well-formed input; these variants
/// cover the boundaries: parsing catalog data, rasterizing a preview, and
/// handing a snapshot to the cart collaborator.
#[derive(Error, Debug)]
pub enum Error {
    /// A catalog color string is not a 3 or 6 digit hex code.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// An option id is not offered for the session's category.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// The preview markup could not be rasterized or encoded.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// Rasterization did not finish within its budget.
    #[error("Rasterization timed out after {0}ms")]
    RasterTimeout(u64),

    /// The cart collaborator failed to accept a snapshot.
    #[error("Cart submission failed: {message}")]
    Submission { message: String, retryable: bool },

    /// JSON (de)serialization of snapshots, profiles or config.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a retryable submission error.
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission {
            message: message.into(),
            retryable: true,
        }
    }

    /// Returns true if the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Submission { retryable, .. } => *retryable,
            Self::RasterTimeout(_) => true,
            _ => false,
        }
    }
}

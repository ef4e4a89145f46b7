use std::path::{Path, PathBuf};

/// Convenience result type used across viewframe.
pub type ViewframeResult<T> = Result<T, ViewframeError>;

/// Top-level error taxonomy.
///
/// Asset and write errors carry the offending path so batch reports can name the frame input or
/// output that failed.
#[derive(thiserror::Error, Debug)]
pub enum ViewframeError {
    /// An input asset path does not exist.
    #[error("asset not found: {}", path.display())]
    AssetNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// An input asset exists but cannot be used (zero dimensions, corrupt data).
    #[error("invalid asset '{}': {reason}", path.display())]
    InvalidAsset {
        /// Path of the asset.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// The composed frame could not be written.
    #[error("write error '{}': {reason}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Invalid user-provided configuration or layer data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The upload collaborator rejected a payload.
    #[error("upload error: {0}")]
    Upload(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ViewframeError {
    /// Build a [`ViewframeError::AssetNotFound`] value.
    pub fn asset_not_found(path: impl AsRef<Path>) -> Self {
        Self::AssetNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Build a [`ViewframeError::InvalidAsset`] value.
    pub fn invalid_asset(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::InvalidAsset {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Build a [`ViewframeError::Write`] value.
    pub fn write(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Build a [`ViewframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ViewframeError::Upload`] value.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Return `true` for errors caused by a bad or missing input asset.
    pub fn is_asset_error(&self) -> bool {
        matches!(self, Self::AssetNotFound { .. } | Self::InvalidAsset { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

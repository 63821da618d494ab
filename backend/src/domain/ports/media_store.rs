//! Port for storing uploaded images.

use async_trait::async_trait;

use crate::domain::{ImageUpload, MediaKind};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// Writing or removing a file failed.
        Io { message: String } => "media store i/o failed: {message}",
        /// The path does not belong to the media root.
        InvalidPath { path: String } => "invalid media path: {path}",
    }
}

/// Storage for uploaded images under the media root.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist the upload and return its media-relative path.
    async fn store(&self, kind: MediaKind, upload: &ImageUpload) -> Result<String, MediaStoreError>;

    /// Remove a previously stored file. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), MediaStoreError>;
}

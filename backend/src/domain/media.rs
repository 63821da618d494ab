//! Base64 image uploads embedded in JSON payloads.
//!
//! Clients send images as `data:image/<ext>;base64,<payload>` strings. The
//! decoded bytes are handed to a [`MediaStore`](crate::domain::ports::MediaStore)
//! which returns a media-relative path for persistence.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const DATA_URL_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";
const EXTENSION_MAX: usize = 10;

/// Errors raised while decoding an image data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUploadError {
    /// The value does not start with `data:image/` or lacks `;base64,`.
    NotImageDataUrl,
    /// The extension is not a short alphanumeric name.
    InvalidExtension,
    /// The payload failed base64 decoding.
    InvalidBase64,
    /// The payload decoded to zero bytes.
    Empty,
}

impl fmt::Display for ImageUploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImageDataUrl => {
                write!(f, "image must be a data:image/<ext>;base64 URL")
            }
            Self::InvalidExtension => write!(f, "image type must be a short alphanumeric name"),
            Self::InvalidBase64 => write!(f, "image payload is not valid base64"),
            Self::Empty => write!(f, "image payload must not be empty"),
        }
    }
}

impl std::error::Error for ImageUploadError {}

/// Where an uploaded image belongs within the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// A user's profile picture.
    Avatar,
    /// The cover image of a recipe.
    RecipeImage,
}

impl MediaKind {
    /// Directory, relative to the media root, holding this kind of file.
    pub fn directory(self) -> &'static str {
        match self {
            Self::Avatar => "users",
            Self::RecipeImage => "recipes/images",
        }
    }
}

/// Decoded image bytes together with their file extension.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    extension: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Parse a `data:image/<ext>;base64,<payload>` string.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::ImageUpload;
    ///
    /// let upload = ImageUpload::from_data_url("data:image/png;base64,aGk=").unwrap();
    /// assert_eq!(upload.extension(), "png");
    /// assert_eq!(upload.bytes(), b"hi");
    /// ```
    pub fn from_data_url(value: &str) -> Result<Self, ImageUploadError> {
        let rest = value
            .trim()
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or(ImageUploadError::NotImageDataUrl)?;
        let (extension, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or(ImageUploadError::NotImageDataUrl)?;

        let extension = extension.to_ascii_lowercase();
        if extension.is_empty()
            || extension.len() > EXTENSION_MAX
            || !extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ImageUploadError::InvalidExtension);
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|_| ImageUploadError::InvalidBase64)?;
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        Ok(Self { extension, bytes })
    }

    /// Lower-case file extension, e.g. `png`.
    pub fn extension(&self) -> &str {
        self.extension.as_str()
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("extension", &self.extension)
            .field("len", &self.bytes.len())
            .finish()
    }
}

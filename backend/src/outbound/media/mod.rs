//! Filesystem media storage for uploaded images.

mod filesystem;

pub use filesystem::FilesystemMediaStore;

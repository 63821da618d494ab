//! `MediaStore` adapter writing into a capability-scoped media directory.
//!
//! Every upload gets a fresh random name, so removing the file behind one
//! record never touches another record's media. Paths returned to callers
//! are relative to the media root, for example `recipes/images/<uuid>.png`.

use std::io::ErrorKind;
use std::path::{Component, Path};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{ImageUpload, MediaKind};

/// Media store rooted at a directory opened once at start-up.
#[derive(Clone)]
pub struct FilesystemMediaStore {
    root: Arc<Dir>,
}

impl FilesystemMediaStore {
    /// Open (creating when missing) the media root.
    ///
    /// # Errors
    ///
    /// Returns [`MediaStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, MediaStoreError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| MediaStoreError::io(format!("create {}: {err}", root.display())))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| MediaStoreError::io(format!("open {}: {err}", root.display())))?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn blocking<T, F>(&self, task: F) -> Result<T, MediaStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, MediaStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || task(&root))
            .await
            .map_err(|err| MediaStoreError::io(err.to_string()))?
    }
}

/// Fresh path for an upload of the given kind.
fn media_path(kind: MediaKind, upload: &ImageUpload) -> String {
    let name = Uuid::new_v4().simple();
    format!("{}/{name}.{}", kind.directory(), upload.extension())
}

/// Accept only plain relative paths below the media root.
fn checked_relative(path: &str) -> Result<&Path, MediaStoreError> {
    let candidate = Path::new(path);
    let plain = !path.is_empty()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(candidate)
    } else {
        Err(MediaStoreError::invalid_path(path))
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn store(&self, kind: MediaKind, upload: &ImageUpload) -> Result<String, MediaStoreError> {
        let path = media_path(kind, upload);
        let bytes = upload.bytes().to_vec();
        let target = path.clone();
        self.blocking(move |root| {
            root.create_dir_all(kind.directory())
                .map_err(|err| MediaStoreError::io(format!("create {}: {err}", kind.directory())))?;
            root.write(&target, &bytes)
                .map_err(|err| MediaStoreError::io(format!("write {target}: {err}")))
        })
        .await?;
        debug!(%path, "stored media file");
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), MediaStoreError> {
        let relative = checked_relative(path)?.to_path_buf();
        let display = path.to_owned();
        self.blocking(move |root| match root.remove_file(&relative) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MediaStoreError::io(format!("remove {display}: {err}"))),
        })
        .await?;
        debug!(path, "removed media file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn media_root() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn upload(payload: &str) -> ImageUpload {
        ImageUpload::from_data_url(&format!("data:image/png;base64,{payload}")).expect("upload")
    }

    #[rstest]
    #[tokio::test]
    async fn stores_under_kind_directory(media_root: TempDir) {
        let store = FilesystemMediaStore::open(media_root.path()).expect("open");

        let path = store
            .store(MediaKind::RecipeImage, &upload("aGk="))
            .await
            .expect("stored");

        assert!(path.starts_with("recipes/images/"));
        assert!(path.ends_with(".png"));
        let written = std::fs::read(media_root.path().join(&path)).expect("file exists");
        assert_eq!(written, b"hi");
    }

    #[rstest]
    #[tokio::test]
    async fn identical_uploads_get_separate_files(media_root: TempDir) {
        let store = FilesystemMediaStore::open(media_root.path()).expect("open");

        let first = store.store(MediaKind::Avatar, &upload("aGk=")).await.expect("first");
        let second = store.store(MediaKind::Avatar, &upload("aGk=")).await.expect("second");
        assert_ne!(first, second);

        store.remove(&first).await.expect("removal");
        assert!(media_root.path().join(&second).exists());
    }

    #[rstest]
    #[tokio::test]
    async fn remove_is_idempotent(media_root: TempDir) {
        let store = FilesystemMediaStore::open(media_root.path()).expect("open");
        let path = store.store(MediaKind::Avatar, &upload("aGk=")).await.expect("stored");

        store.remove(&path).await.expect("first removal");
        store.remove(&path).await.expect("second removal");
        assert!(!media_root.path().join(&path).exists());
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("/etc/passwd")]
    #[case("")]
    #[tokio::test]
    async fn remove_rejects_paths_outside_root(media_root: TempDir, #[case] path: &str) {
        let store = FilesystemMediaStore::open(media_root.path()).expect("open");
        let error = store.remove(path).await.expect_err("rejected");
        assert_eq!(error, MediaStoreError::invalid_path(path));
    }
}

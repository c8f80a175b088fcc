use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use object_store::{path::Path as ObjectPath, ObjectStore as ObjectStoreBackend, PutPayload};
use std::{path::Path, sync::Arc};
use uuid::Uuid;

use super::error::MediaStoreError;
use crate::{
    domain::{
        errors::{CatalogError, CatalogResult},
        models::StoredMedia,
        value_objects::MediaFolder,
    },
    ports::storage::MediaStore,
};

/// MediaStore backed by any object_store implementation.
///
/// Media ids are object keys of the form `<folder>/<uuid>.<ext>`; public URLs
/// are the key appended to a configured base URL.
pub struct ObjectStoreMediaAdapter {
    inner: Arc<dyn ObjectStoreBackend>,
    public_base_url: String,
}

impl ObjectStoreMediaAdapter {
    pub fn new(store: Arc<dyn ObjectStoreBackend>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: store,
            public_base_url,
        }
    }

    /// Adapter over an in-process store, for tests and local development
    pub fn in_memory() -> Self {
        Self::new(super::backends::create_memory_store(), "memory://media")
    }

    pub fn url_for(&self, media_id: &str) -> String {
        format!("{}/{}", self.public_base_url, media_id)
    }

    fn object_name(local_path: &Path) -> String {
        let extension = local_path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());

        format!("{}.{}", Uuid::new_v4(), extension)
    }

    async fn delete_one(&self, media_id: &str) -> Result<(), MediaStoreError> {
        let path = ObjectPath::parse(media_id)
            .map_err(|e| MediaStoreError::Config(format!("Invalid media id '{}': {}", media_id, e)))?;

        match self.inner.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl MediaStore for ObjectStoreMediaAdapter {
    async fn upload(&self, local_path: &Path, folder: &MediaFolder) -> CatalogResult<StoredMedia> {
        let data = Bytes::from(
            tokio::fs::read(local_path)
                .await
                .map_err(MediaStoreError::from)?,
        );

        let media_id = folder.key_for(&Self::object_name(local_path));
        let checksum = format!("{:x}", md5::compute(&data));
        let size = data.len();

        let path = ObjectPath::parse(&media_id)
            .map_err(|e| CatalogError::media(format!("Invalid media id '{}': {}", media_id, e)))?;
        self.inner.put(&path, PutPayload::from(data)).await?;

        tracing::debug!(media_id = %media_id, size, checksum = %checksum, "Stored media");

        Ok(StoredMedia {
            url: self.url_for(&media_id),
            media_id,
        })
    }

    async fn delete_many(&self, media_ids: &[String]) -> CatalogResult<()> {
        let mut distinct: Vec<&str> = Vec::with_capacity(media_ids.len());
        for id in media_ids {
            if !distinct.contains(&id.as_str()) {
                distinct.push(id.as_str());
            }
        }

        let results = join_all(distinct.iter().map(|id| self.delete_one(id))).await;

        let mut first_error = None;
        for (id, result) in distinct.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(media_id = %id, error = %e, "Failed to delete media");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            None => {
                tracing::debug!(count = distinct.len(), "Deleted media");
                Ok(())
            }
            Some(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn local_file(suffix: &str, contents: &[u8]) -> tempfile::TempPath {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.into_temp_path()
    }

    #[tokio::test]
    async fn test_upload_names_objects_by_folder_and_extension() {
        let adapter = ObjectStoreMediaAdapter::in_memory();
        let file = local_file(".PNG", b"png-bytes");

        let stored = adapter.upload(&file, &MediaFolder::default()).await.unwrap();

        assert!(stored.media_id.starts_with("products/"));
        assert!(stored.media_id.ends_with(".png"));
        assert_eq!(stored.url, format!("memory://media/{}", stored.media_id));

        let path = ObjectPath::parse(&stored.media_id).unwrap();
        let bytes = adapter.inner.get(&path).await.unwrap().bytes().await.unwrap();
        assert_eq!(bytes.as_ref(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let adapter = ObjectStoreMediaAdapter::in_memory();
        let file = local_file(".jpg", b"x");
        let stored = adapter.upload(&file, &MediaFolder::default()).await.unwrap();

        let ids = vec![stored.media_id.clone(), stored.media_id.clone()];
        adapter.delete_many(&ids).await.unwrap();
        adapter.delete_many(&ids).await.unwrap();

        let path = ObjectPath::parse(&stored.media_id).unwrap();
        assert!(adapter.inner.head(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_local_file_is_media_error() {
        let adapter = ObjectStoreMediaAdapter::in_memory();
        let err = adapter
            .upload(Path::new("/nonexistent/file.png"), &MediaFolder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Media { .. }));
    }
}

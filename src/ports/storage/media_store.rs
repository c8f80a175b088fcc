use async_trait::async_trait;
use futures::future::join_all;
use std::path::Path;

use crate::domain::{errors::CatalogResult, models::StoredMedia, value_objects::MediaFolder};

/// Port for the external media host.
///
/// Implementations read a file from local disk and return a durable
/// identifier plus a public URL for it.
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    /// Store one local file under a folder
    async fn upload(&self, local_path: &Path, folder: &MediaFolder) -> CatalogResult<StoredMedia>;

    /// Remove stored files by identifier
    async fn delete_many(&self, media_ids: &[String]) -> CatalogResult<()>;

    /// Store several files concurrently, preserving input order.
    ///
    /// If any upload fails, the files this call did store are removed again
    /// (best effort) and the first error is returned.
    async fn upload_many(
        &self,
        local_paths: &[&Path],
        folder: &MediaFolder,
    ) -> CatalogResult<Vec<StoredMedia>> {
        let results = join_all(local_paths.iter().map(|path| self.upload(path, folder))).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(media) => stored.push(media),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(_) => {}
            }
        }

        match first_error {
            None => Ok(stored),
            Some(error) => {
                let orphans: Vec<String> = stored.into_iter().map(|m| m.media_id).collect();
                if !orphans.is_empty() {
                    if let Err(e) = self.delete_many(&orphans).await {
                        tracing::warn!(error = %e, count = orphans.len(), "Failed to remove partially uploaded media");
                    }
                }
                Err(error)
            }
        }
    }
}

use std::io;
use thiserror::Error as ThisError;

use crate::domain::errors::CatalogError;

#[derive(ThisError, Debug)]
pub enum MediaStoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid media store configuration: {0}")]
    Config(String),
}

impl From<MediaStoreError> for CatalogError {
    fn from(err: MediaStoreError) -> Self {
        CatalogError::media(err.to_string())
    }
}

impl From<object_store::Error> for CatalogError {
    fn from(err: object_store::Error) -> Self {
        MediaStoreError::from(err).into()
    }
}

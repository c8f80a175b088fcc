// Infrastructure error types
pub mod error;

// Backend construction
pub mod backends;

pub mod object_store_media_adapter;

pub use backends::{create_local_store, create_memory_store, create_s3_store, S3Config};
pub use error::MediaStoreError;
pub use object_store_media_adapter::ObjectStoreMediaAdapter;

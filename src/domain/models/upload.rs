use std::path::Path;

use tempfile::TempPath;

/// Kinds of media a product can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a declared content type; anything else is not product media
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// A file received from a client and parked on local disk until it is
/// forwarded to the media host.
///
/// The local copy is removed when this value is dropped, on success and on
/// every error path alike.
#[derive(Debug)]
pub struct UploadedFile {
    path: TempPath,
    content_type: String,
    file_name: String,
}

impl UploadedFile {
    pub fn new(path: TempPath, content_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            path,
            content_type: content_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_content_type(&self.content_type)
    }
}

/// Uploads split by media kind
#[derive(Debug, Default)]
pub struct PartitionedUploads {
    /// All images, in the order they were received
    pub images: Vec<UploadedFile>,
    /// The first video received
    pub video: Option<UploadedFile>,
    /// Files dropped because a video was already chosen or the type is unknown
    pub ignored: usize,
}

impl PartitionedUploads {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.video.is_none()
    }
}

/// Keep every image and only the first video
pub fn partition_uploads(files: Vec<UploadedFile>) -> PartitionedUploads {
    let mut partitioned = PartitionedUploads::default();

    for file in files {
        match file.kind() {
            Some(MediaKind::Image) => partitioned.images.push(file),
            Some(MediaKind::Video) if partitioned.video.is_none() => {
                partitioned.video = Some(file)
            }
            _ => partitioned.ignored += 1,
        }
    }

    partitioned
}

/// A file held by the media host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub media_id: String,
    pub url: String,
}

use std::path::Path;

use async_trait::async_trait;

use crate::clipboard::FileBlob;

#[async_trait]
pub trait FileReaderPort: Send + Sync {
    /// Read a local file. `declared_mime` wins over any guess made by the
    /// adapter.
    async fn read_blob(&self, path: &Path, declared_mime: Option<&str>) -> anyhow::Result<FileBlob>;
}

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use sn_core::ports::FileReaderPort;
use sn_core::FileBlob;

/// Media type of a file, from its extension or else its leading bytes.
/// Empty when neither is recognised.
pub fn guess_mime(path: &Path, bytes: &[u8]) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .or_else(|| infer::get(bytes).map(|kind| kind.mime_type()))
        .unwrap_or_default()
        .to_string()
}

pub struct TokioFileReader;

#[async_trait]
impl FileReaderPort for TokioFileReader {
    async fn read_blob(&self, path: &Path, declared_mime: Option<&str>) -> anyhow::Result<FileBlob> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read file failed: {}", path.display()))?;
        let mime = match declared_mime {
            Some(mime) => mime.to_string(),
            None => guess_mime(path, &bytes),
        };
        debug!(path = %path.display(), mime = %mime, len = bytes.len(), "read file for capture");
        Ok(FileBlob {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn guesses_from_extension() {
        assert_eq!(guess_mime(Path::new("a.PNG"), b""), "image/png");
        assert_eq!(guess_mime(Path::new("clip.mp4"), b""), "video/mp4");
        assert_eq!(guess_mime(Path::new("movie.mkv"), b""), "video/x-matroska");
        assert_eq!(guess_mime(Path::new("report.pdf"), b""), "application/pdf");
        assert_eq!(
            guess_mime(Path::new("notes.odt"), b""),
            "application/vnd.oasis.opendocument.text"
        );
    }

    #[test]
    fn falls_back_to_content_without_extension() {
        assert_eq!(guess_mime(Path::new("screenshot"), PNG_MAGIC), "image/png");
        assert_eq!(guess_mime(Path::new("noext"), b"plain words"), "");
    }

    #[tokio::test]
    async fn reads_file_with_declared_or_guessed_mime() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.7").unwrap();

        let blob = TokioFileReader.read_blob(file.path(), None).await.unwrap();
        assert_eq!(blob.mime, "application/pdf");
        assert_eq!(blob.bytes, b"%PDF-1.7");

        let blob = TokioFileReader
            .read_blob(file.path(), Some("application/x-custom"))
            .await
            .unwrap();
        assert_eq!(blob.mime, "application/x-custom");
    }

    #[tokio::test]
    async fn extensionless_image_is_detected_from_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PNG_MAGIC).unwrap();

        let blob = TokioFileReader.read_blob(file.path(), None).await.unwrap();
        assert_eq!(blob.mime, "image/png");
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = TokioFileReader
            .read_blob(Path::new("/definitely/not/here.png"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}

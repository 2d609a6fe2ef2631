use std::future::Future;
use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STD;
use base64::Engine as _;

use crate::config::Config;
use crate::error::{ReportError, Result};

/// Reads user-chosen image files into `data:` URIs.
#[derive(Debug, Clone)]
pub struct ImageReader {
    timeout: Duration,
    max_bytes: u64,
}

impl ImageReader {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        Self { timeout, max_bytes }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.image_read_timeout, config.max_image_bytes)
    }

    pub async fn read(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let read = async {
            let meta = tokio::fs::metadata(path)
                .await
                .map_err(|e| ReportError::image(path, e.to_string()))?;
            if !meta.is_file() {
                return Err(ReportError::image(path, "not a regular file"));
            }
            check_size(path, meta.len(), self.max_bytes)?;
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| ReportError::image(path, e.to_string()))?;
            // The file may have grown since the metadata call.
            check_size(path, bytes.len() as u64, self.max_bytes)?;
            Ok(bytes)
        };

        let bytes = bounded(path, self.timeout, read).await?;

        let uri = encode_data_uri(path, &bytes)?;
        tracing::debug!("Read image {} ({} bytes)", path.display(), bytes.len());
        Ok(uri)
    }

    /// Like `read`, but gives up with `Cancelled` as soon as `cancel` completes.
    pub async fn read_or_cancel<F>(&self, path: impl AsRef<Path>, cancel: F) -> Result<String>
    where
        F: Future<Output = ()>,
    {
        let path = path.as_ref();
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::warn!("Image read cancelled: {}", path.display());
                Err(ReportError::Cancelled)
            }
            res = self.read(path) => res,
        }
    }
}

fn check_size(path: &Path, len: u64, max_bytes: u64) -> Result<()> {
    if len > max_bytes {
        return Err(ReportError::image(
            path,
            format!("file is {} bytes, limit is {}", len, max_bytes),
        ));
    }
    Ok(())
}

async fn bounded<F>(path: &Path, timeout: Duration, read: F) -> Result<Vec<u8>>
where
    F: Future<Output = Result<Vec<u8>>>,
{
    tokio::time::timeout(timeout, read)
        .await
        .map_err(|_| ReportError::image(path, format!("timed out after {:?}", timeout)))?
}

pub fn encode_data_uri(path: &Path, bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(ReportError::image(path, "file is empty"));
    }
    let mime = sniff_mime(bytes)
        .or_else(|| mime_from_extension(path))
        .ok_or_else(|| ReportError::image(path, "unsupported image format (expect JPEG/PNG/GIF/WebP)"))?;
    Ok(format!("data:{};base64,{}", mime, BASE64_STD.encode(bytes)))
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 3 && bytes[..3] == [0xFF, 0xD8, 0xFF] {
        return Some("image/jpeg");
    }
    if bytes.len() >= 8 && &bytes[..8] == b"\x89PNG\r\n\x1a\n" {
        return Some("image/png");
    }
    if bytes.len() >= 6 && (&bytes[..6] == b"GIF87a" || &bytes[..6] == b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    None
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// MIME type and decoded payload size of a base64 `data:` URI.
pub fn describe_data_uri(uri: &str) -> Option<(&str, usize)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let payload = payload.trim_end();
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    let size = (payload.len() / 4) * 3 + match payload.len() % 4 {
        2 => 1,
        3 => 2,
        _ => 0,
    };
    Some((mime, size.saturating_sub(padding)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn reader() -> ImageReader {
        ImageReader::new(Duration::from_secs(5), 1024)
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_mime(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"hello world"), None);
    }

    #[test]
    fn test_encode_data_uri() {
        let uri = encode_data_uri(Path::new("photo.bin"), &[0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");

        let uri = encode_data_uri(Path::new("photo.PNG"), b"abc").unwrap();
        assert_eq!(uri, "data:image/png;base64,YWJj");

        let err = encode_data_uri(Path::new("notes.txt"), b"abc").unwrap_err();
        assert!(matches!(err, ReportError::Image { .. }));

        let err = encode_data_uri(Path::new("empty.png"), b"").unwrap_err();
        assert!(err.to_string().contains("file is empty"));
    }

    #[test]
    fn test_describe_data_uri() {
        assert_eq!(describe_data_uri("data:image/jpeg;base64,/9j/"), Some(("image/jpeg", 3)));
        assert_eq!(describe_data_uri("data:image/png;base64,YWJjZA=="), Some(("image/png", 4)));
        assert_eq!(describe_data_uri("data:image/png;base64,YWJjZGU="), Some(("image/png", 5)));
        assert_eq!(describe_data_uri("https://example.com/a.png"), None);
        assert_eq!(describe_data_uri("data:text/plain,hello"), None);
    }

    #[tokio::test]
    async fn test_read_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("before.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let uri = reader().read(&path).await.unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(describe_data_uri(&uri), Some(("image/png", PNG_HEADER.len())));
    }

    #[tokio::test]
    async fn test_read_rejects_missing_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        assert!(matches!(reader().read(&missing).await, Err(ReportError::Image { .. })));

        let big = dir.path().join("big.png");
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(2048, 0);
        std::fs::write(&big, bytes).unwrap();
        let err = reader().read(&big).await.unwrap_err();
        assert!(err.to_string().contains("limit is 1024"));

        assert!(matches!(reader().read(dir.path()).await, Err(ReportError::Image { .. })));
    }

    #[test]
    fn test_check_size() {
        let path = Path::new("grown.png");
        assert!(check_size(path, 1024, 1024).is_ok());
        let err = check_size(path, 1025, 1024).unwrap_err();
        assert!(matches!(err, ReportError::Image { .. }));
        assert!(err.to_string().contains("file is 1025 bytes, limit is 1024"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_read_times_out() {
        let stalled = std::future::pending::<Result<Vec<u8>>>();
        let err = bounded(Path::new("stalled.png"), Duration::from_secs(10), stalled)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Image { .. }));
        assert!(err.to_string().contains("timed out after 10s"));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_completed_read() {
        let bytes = bounded(Path::new("a.png"), Duration::from_secs(1), async { Ok(vec![1, 2, 3]) })
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_read_or_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("after.gif");
        std::fs::write(&path, b"GIF89a\x01\x00").unwrap();

        let cancelled = reader().read_or_cancel(&path, std::future::ready(())).await;
        assert!(matches!(cancelled, Err(ReportError::Cancelled)));

        let uri = reader()
            .read_or_cancel(&path, std::future::pending::<()>())
            .await
            .unwrap();
        assert!(uri.starts_with("data:image/gif;base64,"));
    }
}

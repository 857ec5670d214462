//! Content fingerprints used for change detection

use dirmirror_types::{BufferSize, Error, Result};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// BLAKE3 digest of a file's full byte content
///
/// Two files with equal fingerprints are treated as identical.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; blake3::OUT_LEN]);

impl ContentFingerprint {
    /// Fingerprint an in-memory buffer
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; blake3::OUT_LEN] {
        &self.0
    }

    /// Lowercase hex rendering of the digest
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentFingerprint({})", self.to_hex())
    }
}

/// Fingerprint a file by streaming it through a fixed-size buffer
pub async fn fingerprint_file(path: &Path, buffer_size: BufferSize) -> Result<ContentFingerprint> {
    let mut file = File::open(path)
        .await
        .map_err(|e| Error::io("open", path, e))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; buffer_size.get()];
    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| Error::io("read", path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(ContentFingerprint(*hasher.finalize().as_bytes()))
}

/// Compare two files by content fingerprint
pub async fn same_content(left: &Path, right: &Path, buffer_size: BufferSize) -> Result<bool> {
    let left = fingerprint_file(left, buffer_size).await?;
    let right = fingerprint_file(right, buffer_size).await?;
    Ok(left == right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    #[tokio::test]
    async fn test_file_fingerprint_matches_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, b"hi").await.unwrap();

        let fingerprint = fingerprint_file(&path, BufferSize::default()).await.unwrap();
        assert_eq!(fingerprint, ContentFingerprint::of_bytes(b"hi"));
        assert_eq!(fingerprint.to_hex().len(), 64);
    }

    #[tokio::test]
    async fn test_streaming_spans_multiple_reads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.bin");
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).await.unwrap();

        let small_buffer = BufferSize::new(BufferSize::MIN).unwrap();
        let fingerprint = fingerprint_file(&path, small_buffer).await.unwrap();
        assert_eq!(fingerprint, ContentFingerprint::of_bytes(&data));
    }

    #[tokio::test]
    async fn test_same_content() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        let c = temp_dir.path().join("c");
        fs::write(&a, b"same").await.unwrap();
        fs::write(&b, b"same").await.unwrap();
        fs::write(&c, b"different").await.unwrap();

        assert!(same_content(&a, &b, BufferSize::default()).await.unwrap());
        assert!(!same_content(&a, &c, BufferSize::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_files_are_equal() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"").await.unwrap();
        fs::write(&b, b"").await.unwrap();

        assert!(same_content(&a, &b, BufferSize::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let error = fingerprint_file(&temp_dir.path().join("gone"), BufferSize::default())
            .await
            .unwrap_err();

        assert!(matches!(error, Error::FileNotFound { .. }));
    }
}

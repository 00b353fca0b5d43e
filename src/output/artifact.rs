//! Temporary storage for the latest crop result
//!
//! Each new result supersedes the previous one, whose temporary file is
//! removed as soon as it is replaced.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

/// One stored crop result
#[derive(Debug)]
pub struct Artifact {
    file: NamedTempFile,
    download_name: String,
    len: u64,
}

impl Artifact {
    /// Where the result currently lives
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Name to offer when saving the result
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy the result to `dest`, returning the number of bytes written
    pub fn save_to(&self, dest: &Path) -> std::io::Result<u64> {
        std::fs::copy(self.file.path(), dest)
    }
}

/// Holds at most one [`Artifact`]
#[derive(Debug, Default)]
pub struct ArtifactSlot {
    current: Option<Artifact>,
}

impl ArtifactSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` as the new result, releasing the previous one
    pub fn store(&mut self, data: &[u8], download_name: &str) -> std::io::Result<&Artifact> {
        let mut file = tempfile::Builder::new()
            .prefix("videocrop-result-")
            .suffix(".mp4")
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;

        if let Some(previous) = self.current.take() {
            debug!(path = %previous.path().display(), "releasing previous result");
        }
        let artifact = self.current.insert(Artifact {
            file,
            download_name: download_name.to_string(),
            len: data.len() as u64,
        });
        Ok(&*artifact)
    }

    pub fn current(&self) -> Option<&Artifact> {
        self.current.as_ref()
    }

    /// Drop the stored result, if any
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_replaces_and_removes_previous() {
        let mut slot = ArtifactSlot::new();
        let first_path = slot.store(b"first", "a cropped.mp4").unwrap().path().to_path_buf();
        assert!(first_path.exists());

        let second = slot.store(b"second!", "b cropped.mp4").unwrap();
        assert_eq!(second.len(), 7);
        assert_eq!(second.download_name(), "b cropped.mp4");
        let second_path = second.path().to_path_buf();

        assert!(!first_path.exists());
        assert_eq!(std::fs::read(&second_path).unwrap(), b"second!");

        assert!(slot.clear());
        assert!(!second_path.exists());
        assert!(slot.current().is_none());
        assert!(!slot.clear());
    }

    #[test]
    fn test_save_to_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.mp4");

        let mut slot = ArtifactSlot::new();
        let artifact = slot.store(b"video bytes", "x cropped.mp4").unwrap();
        assert_eq!(artifact.save_to(&dest).unwrap(), 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"video bytes");
    }
}

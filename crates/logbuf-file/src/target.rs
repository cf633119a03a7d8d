//! Lazily opened append-mode file handle.

use logbuf_core::SinkError;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Destination file shared by the sink variants that drain to local disk.
///
/// The handle opens on first write (creating the file if needed) and
/// stays open until [`close`](FileTarget::close). A target built without
/// a path fails every write with [`SinkError::OutputNotConfigured`];
/// remote producers with no local drain have exactly that shape.
#[derive(Debug)]
pub struct FileTarget {
    path: Option<PathBuf>,
    handle: Mutex<Option<File>>,
}

impl FileTarget {
    /// Target writing to `path`; `None` or a blank path means unset.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        let path = path.filter(|p| !p.to_string_lossy().trim().is_empty());
        Self {
            path,
            handle: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a destination path was set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    /// Open the handle if it isn't open yet.
    pub async fn ensure_open(&self) -> Result<(), SinkError> {
        let mut handle = self.handle.lock().await;
        self.open_into(&mut handle).await
    }

    /// Append raw bytes, opening the handle on first use.
    pub async fn write(&self, bytes: &[u8]) -> Result<(), SinkError> {
        let mut handle = self.handle.lock().await;
        self.open_into(&mut handle).await?;
        if let Some(file) = handle.as_mut() {
            file.write_all(bytes).await?;
            file.flush().await?;
        }
        Ok(())
    }

    /// Release the handle. A later write would reopen it.
    pub async fn close(&self) {
        self.handle.lock().await.take();
    }

    async fn open_into(&self, handle: &mut Option<File>) -> Result<(), SinkError> {
        if handle.is_some() {
            return Ok(());
        }
        let path = self.path.as_ref().ok_or(SinkError::OutputNotConfigured)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        *handle = Some(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_path_fails_with_output_not_configured() {
        let target = FileTarget::new(None);
        assert!(!target.is_configured());
        assert!(matches!(
            target.write(b"x").await,
            Err(SinkError::OutputNotConfigured)
        ));

        let blank = FileTarget::new(Some(PathBuf::from("   ")));
        assert!(!blank.is_configured());
    }

    #[tokio::test]
    async fn writes_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.log");
        let target = FileTarget::new(Some(path.clone()));

        target.write(b"first\n").await.unwrap();
        target.write(b"second\n").await.unwrap();
        target.close().await;
        // Reopens transparently after a close.
        target.write(b"third\n").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\nthird\n");
    }
}

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Local scratch storage for tools that need a filesystem path.
///
/// Every file gets a unique name, so concurrent requests carrying the same
/// original filename never share a path. Files are removed when the returned
/// [`ScratchFile`] is dropped.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    dir: PathBuf,
}

/// A scratch file on disk, deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchSpace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensures the scratch directory exists.
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create scratch dir {}", self.dir.display()))
    }

    /// Writes `data` to a new scratch file named after `original_name`'s extension.
    pub async fn write(&self, original_name: &str, data: &[u8]) -> Result<ScratchFile> {
        let (file, path) = self.create(original_name)?;
        let mut file = tokio::fs::File::from_std(file);
        file.write_all(data).await?;
        file.flush().await?;
        Ok(ScratchFile { path })
    }

    /// Streams `reader` into a new scratch file and waits for the write to finish.
    pub async fn write_stream<R>(&self, original_name: &str, mut reader: R) -> Result<ScratchFile>
    where
        R: AsyncRead + Unpin + Send,
    {
        let (file, path) = self.create(original_name)?;
        let mut file = tokio::fs::File::from_std(file);
        tokio::io::copy(&mut reader, &mut file)
            .await
            .context("Failed to stream into scratch file")?;
        file.flush().await?;
        Ok(ScratchFile { path })
    }

    fn create(&self, original_name: &str) -> Result<(std::fs::File, TempPath)> {
        let suffix = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix("scratch-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .with_context(|| format!("Failed to create scratch file in {}", self.dir.display()))?;

        let file = temp.reopen()?;
        Ok((file, temp.into_temp_path()))
    }
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file for async reading. The handle stays valid after the
    /// `ScratchFile` is dropped on Unix, but callers should keep the guard
    /// alive until they are done.
    pub async fn open(&self) -> Result<tokio::fs::File> {
        tokio::fs::File::open(&self.path)
            .await
            .with_context(|| format!("Failed to open scratch file {}", self.path.display()))
    }
}

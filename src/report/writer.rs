//! Serialized, append-only results file shared by all probers

use crate::error::{CrlfError, Result};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// One URL per line; each line is written and flushed under a single lock,
/// so concurrent probers never interleave partial lines.
pub struct ResultWriter {
    inner: Mutex<BoxedWriter>,
}

impl ResultWriter {
    /// Wraps an already opened writer
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Mutex::new(Box::new(writer)),
        }
    }

    /// Opens `path` for appending, creating it if missing
    pub async fn append_to(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(CrlfError::IoError)?;
        debug!("Writing results to {}", path.display());
        Ok(Self::new(file))
    }

    /// Appends `line` followed by a newline
    pub async fn write_line(&self, line: &str) -> Result<()> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');

        let mut writer = self.inner.lock().await;
        writer
            .write_all(record.as_bytes())
            .await
            .map_err(CrlfError::SinkWrite)?;
        writer.flush().await.map_err(CrlfError::SinkWrite)
    }
}

impl std::fmt::Debug for ResultWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultWriter").finish_non_exhaustive()
    }
}

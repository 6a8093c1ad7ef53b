use crate::error::{NotifyError, Result};
use crate::AlertSink;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use vitalwatch_common::types::Alert;

/// Appends each alert as one JSON line.
pub struct FileSink {
    path: PathBuf,
    // Serializes appends so concurrent sends never interleave lines.
    write_lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(NotifyError::InvalidConfig(
                "file sink path is empty".to_string(),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AlertSink for FileSink {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let mut line = serde_json::to_vec(alert)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "file"
    }
}

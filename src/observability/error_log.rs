//! Append-only error log, one file per UTC day.
//!
//! Files are named `error-YYYYMMDD.log.txt` and hold one
//! `YYYY-MM-DDTHH:MM:SS <message>` line per entry.

use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    dir: Option<PathBuf>,
}

impl ErrorLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()) }
    }

    /// A sink that drops every entry.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// File receiving entries written at `at`.
    pub fn file_path(&self, at: DateTime<Utc>) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("error-{}.log.txt", at.format("%Y%m%d"))))
    }

    fn line(at: DateTime<Utc>, message: &str) -> String {
        format!("{} {}\n", at.format("%Y-%m-%dT%H:%M:%S"), message)
    }

    /// Append an entry. Failures are reported through tracing only.
    pub async fn append(&self, message: &str) {
        let now = Utc::now();
        let Some(path) = self.file_path(now) else {
            return;
        };
        if let Err(e) = Self::write_async(&path, &Self::line(now, message)).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write error log");
        }
    }

    /// Blocking variant for use outside the runtime (startup failures).
    pub fn append_blocking(&self, message: &str) {
        let now = Utc::now();
        let Some(path) = self.file_path(now) else {
            return;
        };
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(Self::line(now, message).as_bytes())
        })();
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write error log");
        }
    }

    async fn write_async(path: &Path, line: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

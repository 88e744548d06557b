use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::models::{AuditEvent, AuditRecord};

/// Number of entries returned by the audit endpoint when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Append-only newline-delimited JSON transaction log.
///
/// Every append is a single write of one complete line to a file opened in
/// append mode. There is no locking; a single writer process is assumed.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

/// The tail of the log as parsed JSON objects, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentEntries {
    pub entries: Vec<Value>,
    /// Lines inside the requested window that were not valid JSON.
    pub skipped: usize,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, event: AuditEvent) -> io::Result<AuditRecord> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let record = AuditRecord::now(event);
        let mut line = serde_json::to_vec(&record).map_err(io::Error::other)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        tracing::debug!("Audit entry appended: {}", record.event.kind());
        Ok(record)
    }

    /// Read at most `limit` of the newest entries.
    ///
    /// Returns `Ok(None)` when the log file has not been created yet.
    pub async fn read_recent(&self, limit: usize) -> io::Result<Option<RecentEntries>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let recent = parse_recent(&String::from_utf8_lossy(&bytes), limit);
        if recent.skipped > 0 {
            tracing::warn!(
                "Skipped {} unparseable line(s) in {}",
                recent.skipped,
                self.path.display()
            );
        }
        Ok(Some(recent))
    }
}

/// Parse the last `limit` non-empty lines of `content`.
pub fn parse_recent(content: &str, limit: usize) -> RecentEntries {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(limit);

    let mut recent = RecentEntries::default();
    for line in &lines[start..] {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => recent.entries.push(value),
            Err(_) => recent.skipped += 1,
        }
    }
    recent
}

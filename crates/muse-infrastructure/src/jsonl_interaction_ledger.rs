//! Append-only interaction ledger stored as JSON lines.

use async_trait::async_trait;
use muse_core::interaction::{InteractionLedger, InteractionRecord, latest_per_turn};
use muse_core::{MuseError, Result};
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::paths::MusePaths;

/// One `InteractionRecord` per line in `interactions.jsonl`.
///
/// Appends are serialized through a mutex so concurrent turns never
/// interleave partial lines.
pub struct JsonlInteractionLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlInteractionLedger {
    pub fn new(paths: &MusePaths) -> Self {
        Self::with_path(paths.ledger_file())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl InteractionLedger for JsonlInteractionLedger {
    async fn append(&self, record: &InteractionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| MuseError::store(format!("cannot open ledger: {}", e)))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn recent(&self, subject_id: &str, limit: usize) -> Result<Vec<InteractionRecord>> {
        let records = self.read_records(|record| record.subject_id == subject_id).await?;
        Ok(latest_per_turn(records, limit))
    }

    async fn find(&self, id: &str) -> Result<Option<InteractionRecord>> {
        let mut records = self.read_records(|record| record.id == id).await?;
        Ok(records.pop())
    }
}

impl JsonlInteractionLedger {
    /// Matching records in file order. Malformed lines are skipped.
    async fn read_records<P>(&self, keep: P) -> Result<Vec<InteractionRecord>>
    where
        P: Fn(&InteractionRecord) -> bool,
    {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MuseError::store(format!("cannot read ledger: {}", e))),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<InteractionRecord>(line) {
                Ok(record) if keep(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed ledger line {} in {}: {}",
                        index + 1,
                        self.path.display(),
                        e
                    );
                }
            }
        }
        Ok(records)
    }
}

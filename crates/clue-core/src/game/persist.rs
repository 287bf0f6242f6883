use super::guess_log::{GuessLogRow, format_record};
use super::serialization::{KnowledgeSnapshot, SnapshotError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Where a session hands its state after every recorded guess.
pub trait PersistenceAdapter {
    fn save_snapshot(&mut self, snapshot: &KnowledgeSnapshot) -> Result<(), PersistError>;

    /// Appends one row, writing `header` first when the log is new.
    fn append_log(&mut self, header: &[String], row: &GuessLogRow) -> Result<(), PersistError>;

    fn load_snapshot(&self) -> Result<Option<KnowledgeSnapshot>, PersistError>;
}

/// Keeps everything in memory; used by tests and embedders without storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    snapshot_json: Option<String>,
    log: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_json(&self) -> Option<&str> {
        self.snapshot_json.as_deref()
    }

    pub fn log_text(&self) -> &str {
        &self.log
    }
}

impl PersistenceAdapter for MemoryStore {
    fn save_snapshot(&mut self, snapshot: &KnowledgeSnapshot) -> Result<(), PersistError> {
        let json = snapshot.to_json().map_err(SnapshotError::from)?;
        self.snapshot_json = Some(json);
        Ok(())
    }

    fn append_log(&mut self, header: &[String], row: &GuessLogRow) -> Result<(), PersistError> {
        if self.log.is_empty() {
            self.log.push_str(&format_record(header));
            self.log.push('\n');
        }
        self.log.push_str(&row.to_csv_line());
        self.log.push('\n');
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<KnowledgeSnapshot>, PersistError> {
        self.snapshot_json
            .as_deref()
            .map(KnowledgeSnapshot::from_json)
            .transpose()
            .map_err(PersistError::from)
    }
}

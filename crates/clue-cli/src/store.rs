//! File-backed persistence: pretty JSON snapshot plus an append-only CSV log.

use clue_core::game::guess_log::{GuessLogRow, format_record};
use clue_core::game::{KnowledgeSnapshot, PersistError, PersistenceAdapter, SnapshotError};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::ResolvedStorage;

#[derive(Debug, Clone)]
pub struct FileStore {
    knowledge: PathBuf,
    guess_log: PathBuf,
}

impl FileStore {
    pub fn new(storage: &ResolvedStorage) -> Self {
        Self {
            knowledge: storage.knowledge.clone(),
            guess_log: storage.guess_log.clone(),
        }
    }

    pub fn knowledge_path(&self) -> &Path {
        &self.knowledge
    }

    pub fn guess_log_path(&self) -> &Path {
        &self.guess_log
    }

    pub fn is_initialized(&self) -> bool {
        self.knowledge.exists()
    }

    /// Removes both files; missing files are fine.
    pub fn reset(&self) -> io::Result<()> {
        for path in [&self.knowledge, &self.guess_log] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    pub fn read_log(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.guess_log) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl PersistenceAdapter for FileStore {
    fn save_snapshot(&mut self, snapshot: &KnowledgeSnapshot) -> Result<(), PersistError> {
        ensure_parent(&self.knowledge)?;
        let json = snapshot.to_json().map_err(SnapshotError::from)?;
        let staging = self.knowledge.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.knowledge)?;
        Ok(())
    }

    fn append_log(&mut self, header: &[String], row: &GuessLogRow) -> Result<(), PersistError> {
        ensure_parent(&self.guess_log)?;
        let fresh = fs::metadata(&self.guess_log)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.guess_log)?;
        if fresh {
            writeln!(file, "{}", format_record(header))?;
        }
        writeln!(file, "{}", row.to_csv_line())?;
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<KnowledgeSnapshot>, PersistError> {
        let json = match fs::read_to_string(&self.knowledge) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(KnowledgeSnapshot::from_json(&json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clue_core::knowledge::{Belief, KnowledgeTable};
    use clue_core::model::registry::{GameSetup, Registry};
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> FileStore {
        FileStore::new(&ResolvedStorage {
            knowledge: dir.join("game").join("knowledge_state.json"),
            guess_log: dir.join("game").join("game_log.csv"),
        })
    }

    #[test]
    fn snapshot_roundtrips_through_disk() {
        let dir = tempdir().expect("temp dir");
        let mut store = store_in(dir.path());
        assert!(store.load_snapshot().expect("readable").is_none());

        let registry =
            Registry::new(&GameSetup::classic(&["Me", "Alice"], "Me", &["Rope"])).expect("setup");
        let snapshot = KnowledgeSnapshot::capture(&registry, &KnowledgeTable::new(&registry), None);
        store.save_snapshot(&snapshot).expect("saved");

        assert!(store.is_initialized());
        let loaded = store.load_snapshot().expect("readable").expect("present");
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.players["Me"]["Rope (weapon)"], Belief::Has);
    }

    #[test]
    fn header_is_written_once() {
        let dir = tempdir().expect("temp dir");
        let mut store = store_in(dir.path());
        let header = vec!["guesser".to_string(), "suspect".to_string()];
        let row = GuessLogRow {
            guesser: "Me".into(),
            suspect: "Green".into(),
            weapon: "Rope".into(),
            room: "Hall".into(),
            asked_order: vec!["Alice".into(), "Bob".into()],
            showed_by: None,
            card_shown: None,
            beliefs: vec![Belief::NotHas],
        };
        store.append_log(&header, &row).expect("append");
        store.append_log(&header, &row).expect("append");

        let text = store.read_log().expect("readable").expect("present");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "guesser,suspect");
        assert_eq!(lines[1], "Me,Green,Rope,Hall,\"Alice,Bob\",,,NOT_HAS");
    }

    #[test]
    fn reset_tolerates_missing_files() {
        let dir = tempdir().expect("temp dir");
        let store = store_in(dir.path());
        store.reset().expect("nothing to remove");
        assert!(store.read_log().expect("readable").is_none());
    }
}

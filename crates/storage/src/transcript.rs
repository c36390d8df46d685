//! Append-only command transcript, one JSONL file per session.

use meetpilot_core::{CommandRecord, Paths, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use tracing::debug;

/// A session transcript as handed back to consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: String,
    pub total_commands: usize,
    pub records: Vec<CommandRecord>,
}

pub struct TranscriptStore {
    paths: Paths,
}

impl TranscriptStore {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    /// Append one record. Each line is an independent JSON document.
    pub fn append(&self, record: &CommandRecord) -> Result<()> {
        let path = self.paths.transcript_file(&record.session_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }

    /// Load all records for a session. Unparsable lines are skipped rather
    /// than failing the whole read.
    pub fn load(&self, session_id: &str) -> Result<Vec<CommandRecord>> {
        let path = self.paths.transcript_file(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CommandRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    debug!(error = %e, "Failed to parse transcript line, skipping");
                }
            }
        }

        Ok(records)
    }

    pub fn transcript(&self, session_id: &str) -> Result<Transcript> {
        let records = self.load(session_id)?;
        Ok(Transcript {
            session_id: session_id.to_string(),
            total_commands: records.len(),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(session_id: &str, command: &str, response: &str) -> CommandRecord {
        CommandRecord {
            session_id: session_id.to_string(),
            command_text: command.to_string(),
            response: response.to_string(),
            is_ai_response: false,
            processing_time_ms: 5,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn append_and_load_preserve_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(Paths::with_base(dir.path().to_path_buf()));

        store.append(&record("s1", "hello", "Hello!")).unwrap();
        store.append(&record("s1", "browser: screenshot", "Screenshot saved")).unwrap();

        let records = store.load("s1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].command_text, "hello");
        assert_eq!(records[1].command_text, "browser: screenshot");
    }

    #[test]
    fn load_missing_session_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(Paths::with_base(dir.path().to_path_buf()));
        assert!(store.load("nope").unwrap().is_empty());
    }

    #[test]
    fn bad_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().to_path_buf());
        let store = TranscriptStore::new(paths.clone());

        store.append(&record("s2", "hello", "Hello!")).unwrap();
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(paths.transcript_file("s2"))
                .unwrap();
            writeln!(file, "not json at all").unwrap();
        }
        store.append(&record("s2", "time", "12:00:00")).unwrap();

        let records = store.load("s2").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn transcript_counts_commands() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(Paths::with_base(dir.path().to_path_buf()));
        store.append(&record("s3", "hello", "Hello!")).unwrap();

        let transcript = store.transcript("s3").unwrap();
        assert_eq!(transcript.session_id, "s3");
        assert_eq!(transcript.total_commands, 1);
    }
}

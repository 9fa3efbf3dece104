// Run history log
// Stored as ~/.local/share/ipo/history.json (platform data dir)

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use ipo_engine::RunSummary;

/// Oldest entries are dropped past this many runs.
pub const HISTORY_CAP: usize = 24;

/// One saved run: a label, a timestamp, and the portfolio summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: String,
    /// ISO 8601 save time.
    pub saved_at: String,
    pub summary: RunSummary,
}

/// Append-only log of past run summaries, capped at [`HISTORY_CAP`].
///
/// A missing or unreadable file is treated as an empty log so a first run
/// (or a corrupted file) never blocks an analysis.
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location under the platform data directory.
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("ipo").join("history.json")
    }

    pub fn open_default() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load all entries, oldest first. Silently empty on any read failure.
    pub fn load(&self) -> Vec<HistoryEntry> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("Error parsing history.json: {}", e);
                    eprintln!("Starting with an empty history");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    /// Append a run and persist, dropping the oldest entries past the cap.
    /// Returns the log as written.
    pub fn append(&self, label: &str, summary: &RunSummary) -> Result<Vec<HistoryEntry>, String> {
        let mut entries = self.load();
        entries.push(HistoryEntry {
            label: label.to_string(),
            saved_at: Utc::now().to_rfc3339(),
            summary: summary.clone(),
        });

        if entries.len() > HISTORY_CAP {
            let excess = entries.len() - HISTORY_CAP;
            entries.drain(..excess);
        }

        self.save(&entries)?;
        Ok(entries)
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| e.to_string())?;
        fs::write(&self.path, json).map_err(|e| e.to_string())
    }
}

//! Append-only score log.
//!
//! One record per completed quiz stage, in a plain text format that other
//! tooling already reads:
//!
//! ```text
//! ID: OWLS-AG-1A2B3C
//! Team name: owls
//! Players: ada, grace
//! Stage: 1
//! Points: 96
//! ------------------------------
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

const SEPARATOR_WIDTH: usize = 30;

/// One stage result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub uid: String,
    pub team: String,
    pub players: String,
    pub stage: u8,
    pub points: u32,
}

impl ScoreRecord {
    /// Render the record exactly as it is stored.
    pub fn render(&self) -> String {
        format!(
            "ID: {}\nTeam name: {}\nPlayers: {}\nStage: {}\nPoints: {}\n{}\n",
            self.uid,
            self.team,
            self.players,
            self.stage,
            self.points,
            "-".repeat(SEPARATOR_WIDTH)
        )
    }
}

/// Score log backed by a single file.
#[derive(Debug)]
pub struct ScoreLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ScoreLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The file is opened and closed per call.
    pub fn append(&self, record: &ScoreRecord) -> io::Result<()> {
        let body = record.render();
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(body.as_bytes())?;
        file.flush()?;

        debug!(
            "Recorded stage {} for {} ({} points)",
            record.stage, record.uid, record.points
        );
        Ok(())
    }
}

use crate::app_dirs::AppDirs;
use crate::session::GameSummary;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultsLogError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// One line of the results log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRow {
    pub date: String,
    pub outcome: String,
    pub final_score: i64,
    pub score: i64,
    pub enemies: u32,
    pub missed_count: usize,
    pub missed_words: String,
}

impl From<&GameSummary> for ResultRow {
    fn from(summary: &GameSummary) -> Self {
        Self {
            date: Local::now().format("%c").to_string(),
            outcome: summary.outcome.to_string(),
            final_score: summary.final_score,
            score: summary.score,
            enemies: summary.enemies,
            missed_count: summary.missed_words.len(),
            missed_words: summary.missed_joined(),
        }
    }
}

pub trait ResultsLog {
    fn append(&self, summary: &GameSummary) -> Result<(), ResultsLogError>;
}

/// Append-only CSV log of finished games.
#[derive(Debug, Clone)]
pub struct CsvResultsLog {
    path: PathBuf,
}

impl CsvResultsLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::results_path().unwrap_or_else(|| PathBuf::from("wordfall_results.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> Result<Vec<ResultRow>, ResultsLogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<Result<Vec<ResultRow>, _>>()?;
        Ok(rows)
    }

    /// Best final score across every logged game.
    pub fn best_score(&self) -> Result<Option<i64>, ResultsLogError> {
        Ok(self.rows()?.iter().map(|r| r.final_score).max())
    }
}

impl Default for CsvResultsLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsLog for CsvResultsLog {
    fn append(&self, summary: &GameSummary) -> Result<(), ResultsLogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(ResultRow::from(summary))?;
        writer.flush()?;
        Ok(())
    }
}

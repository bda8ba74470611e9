//! Persisted high score
//!
//! One scalar, stored as a tiny JSON document and replaced wholesale on
//! every new record. A missing or unreadable file simply means no record
//! yet.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default save file, created in the working directory
pub const DEFAULT_HIGH_SCORE_FILE: &str = "snake_high_score.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreFile {
    best_score: u32,
}

/// Loads the best score once at startup and write-replaces the file on
/// each record-setting game over
#[derive(Debug)]
pub struct HighScoreStore {
    path: PathBuf,
    best: u32,
}

impl HighScoreStore {
    /// Load the stored best score, defaulting to 0
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let best = Self::read_best(&path).unwrap_or(0);
        Self { path, best }
    }

    fn read_best(path: &Path) -> Option<u32> {
        let text = fs::read_to_string(path).ok()?;
        let file: HighScoreFile = serde_json::from_str(&text).ok()?;
        Some(file.best_score)
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record a finished game's score
    ///
    /// Returns true when the score sets a new record. The in-memory best
    /// updates before the write, so a failed write degrades to a session
    /// record rather than losing the comparison.
    pub fn record(&mut self, score: u32) -> Result<bool> {
        if score <= self.best {
            return Ok(false);
        }
        self.best = score;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }
        let json = serde_json::to_string_pretty(&HighScoreFile {
            best_score: self.best,
        })
        .context("Failed to serialize high score")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;
        Ok(true)
    }
}

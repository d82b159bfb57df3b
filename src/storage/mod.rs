//! Document store access.
//!
//! The league's documents live in a data directory as JSON Lines files:
//! - Team directory (`teams.jsonl`)
//! - Game results and schedule (`games.jsonl`)
//! - Draft classes and picks (`draft_classes.jsonl`, `draft_picks.jsonl`)
//! - Player directory (`players.jsonl`)

mod jsonl;
mod store;

pub use jsonl::*;
pub use store::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document at {path:?} line {line}: {reason}")]
    InvalidDocument {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn entity_path(&self, entity: EntityType) -> PathBuf {
        self.data_dir.join(entity.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

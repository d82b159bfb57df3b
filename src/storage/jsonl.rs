//! JSONL (JSON Lines) storage.
//!
//! Each line is one JSON document. A line that does not parse fails the whole
//! read with its 1-based line number.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::{StorageConfig, StorageError};

/// Document collections kept in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Team,
    Game,
    DraftClass,
    DraftPick,
    Player,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Team => "teams.jsonl",
            EntityType::Game => "games.jsonl",
            EntityType::DraftClass => "draft_classes.jsonl",
            EntityType::DraftPick => "draft_picks.jsonl",
            EntityType::Player => "players.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write documents, replacing the entire file.
    ///
    /// Writes to a sibling temp file first and renames it over the target so a
    /// reader never sees a half-written collection.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp_path = self.path.with_extension("jsonl.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            for entity in entities {
                writeln!(writer, "{}", serde_json::to_string(entity)?)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        info!("Wrote {} documents to {:?}", entities.len(), self.path);
        Ok(entities.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    /// Read all documents, failing on the first line that does not parse.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        let mut entities = Vec::new();
        self.for_each_line(|line_num, line| {
            let entity = serde_json::from_str(line).map_err(|e| StorageError::InvalidDocument {
                path: self.path.clone(),
                line: line_num,
                reason: e.to_string(),
            })?;
            entities.push(entity);
            Ok(())
        })?;

        debug!("Read {} documents from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Visit each non-blank line with its 1-based line number.
    /// A missing file reads as empty.
    fn for_each_line<F>(&self, mut visit: F) -> Result<(), StorageError>
    where
        F: FnMut(usize, &str) -> Result<(), StorageError>,
    {
        if !self.path.exists() {
            return Ok(());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            visit(idx + 1, &line)?;
        }
        Ok(())
    }
}

/// Keep the last document seen for each id, preserving first-seen order.
pub fn dedup_by_id<T, F>(items: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let id = id_of(&item).to_string();
        match index.get(&id) {
            Some(&pos) => out[pos] = item,
            None => {
                index.insert(id, out.len());
                out.push(item);
            }
        }
    }
    out
}

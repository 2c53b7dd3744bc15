//! Storage collaborator interface
//!
//! The pipeline emits fully decoded records; persistence and indexing are
//! somebody else's job. [`EntityStore`] is the seam: anything that accepts
//! a decoded record can sit behind it. [`JsonLinesStore`] is the bundled
//! implementation used by the CLI import command.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use async_trait::async_trait;

use crate::Pokemon;

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Collaborator that accepts decoded records for persistence.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Persist one decoded record.
    async fn persist(&mut self, pokemon: &Pokemon) -> StoreResult<()>;

    /// Flush any buffered output.
    async fn flush(&mut self) -> StoreResult<()>;
}

/// JSON Lines file store: one serialized record per line.
pub struct JsonLinesStore {
    writer: BufWriter<File>,
    records_written: u64,
}

impl JsonLinesStore {
    /// Create (truncating) the output file.
    pub fn create<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

#[async_trait]
impl EntityStore for JsonLinesStore {
    async fn persist(&mut self, pokemon: &Pokemon) -> StoreResult<()> {
        serde_json::to_writer(&mut self.writer, pokemon)?;
        self.writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    async fn flush(&mut self) -> StoreResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NamedResource, TypeSlot};

    fn pokemon(id: u32, name: &str) -> Pokemon {
        Pokemon {
            id,
            name: name.to_string(),
            height: 4,
            weight: 60,
            base_experience: Some(112),
            stats: vec![],
            types: vec![TypeSlot {
                slot: 1,
                type_ref: NamedResource {
                    name: "electric".to_string(),
                    url: "https://pokeapi.co/api/v2/type/13/".to_string(),
                },
            }],
            abilities: vec![],
            moves: vec![],
        }
    }

    #[tokio::test]
    async fn test_jsonl_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.jsonl");

        let mut store = JsonLinesStore::create(&path).expect("create store");
        store.persist(&pokemon(25, "pikachu")).await.expect("persist");
        store.persist(&pokemon(26, "raichu")).await.expect("persist");
        store.flush().await.expect("flush");
        assert_eq!(store.records_written(), 2);
        drop(store);

        let contents = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Pokemon = serde_json::from_str(lines[0]).expect("line decodes");
        assert_eq!(first.name, "pikachu");
    }
}

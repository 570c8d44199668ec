use crate::error::IndexError;
use crate::index::TicketIndex;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
    /// Dataset the snapshot was built from.
    pub source: Option<String>,
}

impl MetaFile {
    pub fn for_index(index: &TicketIndex, created_at: String, source: Option<String>) -> Self {
        Self {
            num_docs: index.len() as u32,
            num_terms: index.vocabulary_len() as u32,
            created_at,
            version: SNAPSHOT_VERSION,
            source,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_index(paths: &IndexPaths, index: &TicketIndex) -> Result<(), IndexError> {
    create_dir_all(&paths.root).map_err(|e| IndexError::io(&paths.root, e))?;
    let file = paths.index();
    let f = File::create(&file).map_err(|e| IndexError::io(&file, e))?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, index)?;
    w.flush().map_err(|e| IndexError::io(&file, e))?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<TicketIndex, IndexError> {
    let file = paths.index();
    let f = File::open(&file).map_err(|e| IndexError::io(&file, e))?;
    let index = bincode::deserialize_from(BufReader::new(f))?;
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<(), IndexError> {
    create_dir_all(&paths.root).map_err(|e| IndexError::io(&paths.root, e))?;
    let file = paths.meta();
    let mut f = File::create(&file).map_err(|e| IndexError::io(&file, e))?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes()).map_err(|e| IndexError::io(&file, e))?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile, IndexError> {
    let file = paths.meta();
    let mut f = File::open(&file).map_err(|e| IndexError::io(&file, e))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf).map_err(|e| IndexError::io(&file, e))?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write the index and its metadata into `paths.root`.
pub fn save_snapshot(paths: &IndexPaths, index: &TicketIndex, meta: &MetaFile) -> Result<(), IndexError> {
    save_index(paths, index)?;
    save_meta(paths, meta)?;
    Ok(())
}

/// Load a snapshot, refusing formats written by a different version.
pub fn load_snapshot(paths: &IndexPaths) -> Result<(TicketIndex, MetaFile), IndexError> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        return Err(IndexError::SnapshotVersion { found: meta.version, expected: SNAPSHOT_VERSION });
    }
    let index = load_index(paths)?;
    tracing::info!(root = %paths.root.display(), num_docs = index.len(), "loaded index snapshot");
    Ok((index, meta))
}

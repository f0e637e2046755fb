//! In-memory knowledge corpus: the read snapshot produced by the ingestion
//! tool.
//!
//! Snapshots are JSON arrays (`.json`) or JSON Lines (`.jsonl`/`.ndjson`)
//! of [`KnowledgeDocument`] records. Document ids must be unique.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::KnowledgeDocument;

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<KnowledgeDocument>,
    positions: HashMap<String, usize>,
}

impl Corpus {
    pub fn new(documents: Vec<KnowledgeDocument>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(documents.len());
        for (i, doc) in documents.iter().enumerate() {
            if positions.insert(doc.id.clone(), i).is_some() {
                return Err(Error::DuplicateDocument(doc.id.clone()));
            }
        }
        Ok(Self { documents, positions })
    }

    pub fn empty() -> Self { Self::default() }

    /// Load one snapshot file, picking the format from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let docs = read_snapshot(path)?;
        info!(path = %path.display(), documents = docs.len(), "loaded corpus snapshot");
        Self::new(docs)
    }

    /// Merge every snapshot under `dir` in sorted path order.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let files = list_snapshot_files(dir);
        if files.is_empty() {
            info!(dir = %dir.display(), "no corpus snapshots found");
            return Ok(Self::empty());
        }
        let mut all = Vec::new();
        for (i, file) in files.iter().enumerate() {
            debug!(file = %file.display(), n = i + 1, of = files.len(), "reading snapshot");
            all.extend(read_snapshot(file)?);
        }
        info!(files = files.len(), documents = all.len(), "loaded corpus directory");
        Self::new(all)
    }

    /// `from_path` for files, `load_dir` for directories.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() { Self::load_dir(path) } else { Self::from_path(path) }
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn documents(&self) -> &[KnowledgeDocument] { &self.documents }

    pub fn get(&self, id: &str) -> Option<&KnowledgeDocument> {
        self.positions.get(id).map(|&i| &self.documents[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> { self.positions.get(id).copied() }

    /// Digest over ids and contents, used to label index generations.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for doc in &self.documents {
            hasher.update(doc.id.as_bytes());
            hasher.update(&[0]);
            hasher.update(doc.content.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize().to_hex()[..16].to_string()
    }
}

fn read_snapshot(path: &Path) -> Result<Vec<KnowledgeDocument>> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    match ext {
        "json" => {
            let raw = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        "jsonl" | "ndjson" => {
            let raw = fs::read_to_string(path)?;
            let mut docs = Vec::new();
            for (lineno, line) in raw.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() { continue; }
                let doc = serde_json::from_str(line)
                    .map_err(|e| Error::Operation(format!("{}:{}: {}", path.display(), lineno + 1, e)))?;
                docs.push(doc);
            }
            Ok(docs)
        }
        _ => Err(Error::InvalidConfig(format!("unsupported corpus snapshot format: {}", path.display()))),
    }
}

fn list_snapshot_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl" | "ndjson")))
        .collect();
    files.sort();
    files
}

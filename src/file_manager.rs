//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file usate dalle trasformazioni.
//!
//! ## Responsabilità:
//! - `TargetFile`: path risolto con stem e suffisso già calcolati
//! - Scansione di directory (superficiale o ricorsiva) con `walkdir`
//! - Verifica che un output sia stato davvero scritto prima di cancellare il sorgente
//! - Rename senza sovrascrittura e ricerca dei file sidecar `*.Identifier`
//!
//! ## Sicurezza operazioni:
//! - Un sorgente si cancella solo dopo `verify_written()` sull'output
//! - Mai cancellare un sorgente che coincide con il proprio output
//! - Mai sovrascrivere un file esistente durante il rename

use crate::error::BatchError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Suffix of browser-download sidecar files
pub const IDENTIFIER_SUFFIX: &str = ".Identifier";

/// A file selected for transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFile {
    pub path: PathBuf,
    /// File name without its last extension
    pub stem: String,
    /// Last extension including the dot, empty if none
    pub suffix: String,
}

impl TargetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self { path, stem, suffix }
    }

    /// Directory containing the file (empty for bare file names)
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Path of a file with the given name next to this one
    pub fn sibling(&self, file_name: &str) -> PathBuf {
        self.parent().join(file_name)
    }
}

/// How deep a directory specifier is scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDepth {
    /// Direct children only
    Shallow,
    /// The whole tree
    Recursive,
}

/// File discovery and safe file operations
pub struct FileManager;

impl FileManager {
    /// List regular files under `dir`, sorted by name within each directory
    pub fn list_files(dir: &Path, depth: ScanDepth) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
        if depth == ScanDepth::Shallow {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.path().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry under {}: {}", dir.display(), e),
            }
        }
        files
    }

    /// Sidecar `*.Identifier` files directly inside `dir`
    pub fn find_identifiers(dir: &Path) -> Vec<PathBuf> {
        Self::list_files(dir, ScanDepth::Shallow)
            .into_iter()
            .filter(|path| crate::config::has_suffix(path, IDENTIFIER_SUFFIX))
            .collect()
    }

    /// Confirms `path` is a non-empty regular file and returns its size
    pub async fn verify_written(path: &Path) -> Result<u64, BatchError> {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Ok(metadata.len()),
            Ok(_) | Err(_) => Err(BatchError::MissingOutput(path.to_path_buf())),
        }
    }

    /// True if both paths exist and resolve to the same file
    pub async fn is_same_file(a: &Path, b: &Path) -> bool {
        match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Rename `from` to `to` unless `to` is already taken by another file
    pub async fn rename_no_clobber(from: &Path, to: &Path) -> Result<(), BatchError> {
        if fs::symlink_metadata(to).await.is_ok() && !Self::is_same_file(from, to).await {
            return Err(BatchError::DestinationExists(to.to_path_buf()));
        }
        fs::rename(from, to).await?;
        debug!("Renamed {} -> {}", from.display(), to.display());
        Ok(())
    }
}

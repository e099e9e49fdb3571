//! # Cleanup Module
//!
//! Destructive steps that run after every transformation of a batch:
//! - deletion of sources whose output was verified written
//! - deletion of `*.Identifier` sidecar files in input directories
//!
//! Failures are recorded in the report and never stop the remaining deletions.

use crate::error::BatchError;
use crate::file_manager::FileManager;
use crate::optimizer::report::BatchReport;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct Cleanup;

impl Cleanup {
    /// Delete `source` once `output` is confirmed on disk.
    ///
    /// Returns `false` without deleting when both paths are the same file.
    pub async fn delete_source(source: &Path, output: &Path) -> Result<bool, BatchError> {
        FileManager::verify_written(output).await?;
        if FileManager::is_same_file(source, output).await {
            debug!("Keeping {}: it is its own output", source.display());
            return Ok(false);
        }
        tokio::fs::remove_file(source).await?;
        Ok(true)
    }

    /// Delete the source of every `Written` item in the report
    pub async fn delete_sources(report: &mut BatchReport) {
        let pairs: Vec<(PathBuf, PathBuf)> = report
            .written()
            .map(|(source, output)| (source.to_path_buf(), output.to_path_buf()))
            .collect();
        let mut owners: HashMap<&Path, HashSet<&Path>> = HashMap::new();
        for (source, output) in &pairs {
            owners.entry(output.as_path()).or_default().insert(source.as_path());
        }
        let shared: HashSet<PathBuf> = owners
            .into_iter()
            .filter(|(_, sources)| sources.len() > 1)
            .map(|(output, _)| output.to_path_buf())
            .collect();
        let mut seen = HashSet::new();

        for (source, output) in pairs {
            // The same source can be listed twice by overlapping suffixes
            if !seen.insert(source.clone()) {
                continue;
            }
            // An output written by several sources holds only one of them
            if shared.contains(&output) {
                let e = BatchError::DestinationExists(output);
                warn!("Keeping source {}: {}", source.display(), e);
                report.add_cleanup_failure(source, &e);
                continue;
            }
            match Self::delete_source(&source, &output).await {
                Ok(true) => {
                    debug!("Deleted source {}", source.display());
                    report.add_deleted(source);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Keeping source {}: {}", source.display(), e);
                    report.add_cleanup_failure(source, &e);
                }
            }
        }
    }

    /// Delete `*.Identifier` files directly inside each input directory
    pub async fn delete_identifiers(inputs: &[PathBuf], report: &mut BatchReport) {
        for dir in inputs.iter().filter(|input| input.is_dir()) {
            for sidecar in FileManager::find_identifiers(dir) {
                match tokio::fs::remove_file(&sidecar).await {
                    Ok(()) => {
                        info!("Deleted identifier {}", sidecar.display());
                        report.add_deleted(sidecar);
                    }
                    Err(e) => {
                        let e = BatchError::from(e);
                        warn!("Failed to delete identifier {}: {}", sidecar.display(), e);
                        report.add_cleanup_failure(sidecar, &e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::report::Outcome;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_delete_source_requires_output() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.png");
        let output = temp_dir.path().join("a.jpg");
        std::fs::write(&source, b"png").unwrap();

        let result = Cleanup::delete_source(&source, &output).await;
        assert!(matches!(result, Err(BatchError::MissingOutput(_))));
        assert!(source.exists());

        std::fs::write(&output, b"jpg").unwrap();
        assert!(Cleanup::delete_source(&source, &output).await.unwrap());
        assert!(!source.exists());
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_delete_source_never_removes_own_output() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.jpg");
        std::fs::write(&file, b"jpg").unwrap();

        assert!(!Cleanup::delete_source(&file, &file).await.unwrap());
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_delete_sources_keeps_sources_sharing_an_output() {
        let temp_dir = TempDir::new().unwrap();
        let lower = temp_dir.path().join("photo.png");
        let upper = temp_dir.path().join("photo.PNG");
        let output = temp_dir.path().join("photo.jpg");
        std::fs::write(&lower, b"png").unwrap();
        std::fs::write(&upper, b"PNG").unwrap();
        std::fs::write(&output, b"jpg").unwrap();

        let mut report = BatchReport::new();
        report.record(lower.clone(), Ok(Outcome::Written { output: output.clone() }));
        report.record(upper.clone(), Ok(Outcome::Written { output: output.clone() }));

        Cleanup::delete_sources(&mut report).await;
        assert!(lower.exists());
        assert!(upper.exists());
        assert!(report.deleted.is_empty());
        assert_eq!(report.cleanup_failures.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_sources_records_results() {
        let temp_dir = TempDir::new().unwrap();
        let ok_src = temp_dir.path().join("ok.png");
        let ok_out = temp_dir.path().join("ok.jpg");
        let lost_src = temp_dir.path().join("lost.png");
        std::fs::write(&ok_src, b"png").unwrap();
        std::fs::write(&ok_out, b"jpg").unwrap();
        std::fs::write(&lost_src, b"png").unwrap();

        let mut report = BatchReport::new();
        report.record(ok_src.clone(), Ok(Outcome::Written { output: ok_out }));
        report.record(ok_src.clone(), Ok(Outcome::Written { output: temp_dir.path().join("ok.jpg") }));
        report.record(
            lost_src.clone(),
            Ok(Outcome::Written {
                output: temp_dir.path().join("lost.jpg"),
            }),
        );

        Cleanup::delete_sources(&mut report).await;
        assert_eq!(report.deleted, vec![ok_src.clone()]);
        assert_eq!(report.cleanup_failures.len(), 1);
        assert!(!ok_src.exists());
        assert!(lost_src.exists());
    }

    #[tokio::test]
    async fn test_delete_identifiers() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("a.png"), b"png").unwrap();
        std::fs::write(root.join("a.png.Identifier"), b"zone").unwrap();
        std::fs::write(root.join("b.Identifier"), b"zone").unwrap();

        let mut report = BatchReport::new();
        Cleanup::delete_identifiers(&[root.to_path_buf(), root.join("a.png")], &mut report).await;

        assert_eq!(report.deleted.len(), 2);
        assert!(root.join("a.png").exists());
        assert!(!root.join("b.Identifier").exists());
    }
}

//! # Batch Report Module
//!
//! Raccoglie l'esito di ogni file e delle operazioni di cleanup.
//!
//! ## Stati per file:
//! - **Done**: trasformazione riuscita (`Written`, `Renamed`, `Unchanged`, `Planned`)
//! - **Skipped**: file lasciato intatto con diagnostica (stem non numerico)
//! - **Failed**: errore isolato, il batch prosegue
//!
//! Il report non viene mai svuotato silenziosamente: ogni errore compare nel
//! riepilogo finale e determina l'exit status.

use crate::error::BatchError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of a successful per-file transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A new or overwritten output file
    Written { output: PathBuf },
    /// The source was renamed
    Renamed { to: PathBuf },
    /// Nothing to do, the file was not touched
    Unchanged,
    /// Dry run: would have been processed
    Planned,
}

/// Final state of a target file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Done { outcome: Outcome },
    Skipped { reason: String },
    Failed { error: String },
}

/// One entry per target file, in processing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub path: PathBuf,
    pub status: ItemStatus,
}

impl ItemReport {
    /// Short label used in logs and JSON events
    pub fn label(&self) -> &'static str {
        match &self.status {
            ItemStatus::Done { outcome } => match outcome {
                Outcome::Written { .. } => "written",
                Outcome::Renamed { .. } => "renamed",
                Outcome::Unchanged => "unchanged",
                Outcome::Planned => "planned",
            },
            ItemStatus::Skipped { .. } => "skipped",
            ItemStatus::Failed { .. } => "failed",
        }
    }

    /// Output or rename destination, if any
    pub fn destination(&self) -> Option<&Path> {
        match &self.status {
            ItemStatus::Done {
                outcome: Outcome::Written { output },
            } => Some(output.as_path()),
            ItemStatus::Done {
                outcome: Outcome::Renamed { to },
            } => Some(to.as_path()),
            _ => None,
        }
    }

    /// Skip reason or error message
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Skipped { reason } => Some(reason.as_str()),
            ItemStatus::Failed { error } => Some(error.as_str()),
            ItemStatus::Done { .. } => None,
        }
    }
}

/// Statistics and per-file results of one batch
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
    /// Sources and sidecar files removed during cleanup
    pub deleted: Vec<PathBuf>,
    /// Cleanup steps that failed: (path, error)
    pub cleanup_failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result of one target and returns the stored entry
    pub fn record(&mut self, path: PathBuf, result: Result<Outcome, BatchError>) -> &ItemReport {
        let status = match result {
            Ok(outcome) => ItemStatus::Done { outcome },
            Err(e) if e.is_skip() => ItemStatus::Skipped { reason: e.to_string() },
            Err(e) => ItemStatus::Failed { error: e.to_string() },
        };
        self.items.push(ItemReport { path, status });
        &self.items[self.items.len() - 1]
    }

    pub fn add_deleted(&mut self, path: PathBuf) {
        self.deleted.push(path);
    }

    pub fn add_cleanup_failure(&mut self, path: PathBuf, error: &BatchError) {
        self.cleanup_failures.push((path, error.to_string()));
    }

    /// (source, output) pairs of files that produced a new output
    pub fn written(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.items.iter().filter_map(|item| match &item.status {
            ItemStatus::Done {
                outcome: Outcome::Written { output },
            } => Some((item.path.as_path(), output.as_path())),
            _ => None,
        })
    }

    fn count(&self, label: &str) -> usize {
        self.items.iter().filter(|item| item.label() == label).count()
    }

    pub fn files_processed(&self) -> usize {
        self.items.len()
    }

    pub fn files_written(&self) -> usize {
        self.count("written")
    }

    pub fn files_renamed(&self) -> usize {
        self.count("renamed")
    }

    pub fn files_unchanged(&self) -> usize {
        self.count("unchanged")
    }

    pub fn files_planned(&self) -> usize {
        self.count("planned")
    }

    pub fn files_skipped(&self) -> usize {
        self.count("skipped")
    }

    pub fn errors(&self) -> usize {
        self.count("failed")
    }

    /// Failed items: (path, error)
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.items.iter().filter_map(|item| match &item.status {
            ItemStatus::Failed { error } => Some((item.path.as_path(), error.as_str())),
            _ => None,
        })
    }

    /// True if any file or cleanup step failed
    pub fn has_failures(&self) -> bool {
        self.errors() > 0 || !self.cleanup_failures.is_empty()
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Written: {} | Renamed: {} | Unchanged: {} | Planned: {} | Skipped: {} | Errors: {} | Deleted: {} | Cleanup errors: {}",
            self.files_processed(),
            self.files_written(),
            self.files_renamed(),
            self.files_unchanged(),
            self.files_planned(),
            self.files_skipped(),
            self.errors(),
            self.deleted.len(),
            self.cleanup_failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_classifies_results() {
        let mut report = BatchReport::new();
        report.record(
            PathBuf::from("a.png"),
            Ok(Outcome::Written {
                output: PathBuf::from("a.jpg"),
            }),
        );
        report.record(PathBuf::from("abc.jpg"), Err(BatchError::InvalidStem("abc.jpg".into())));
        let failed = report.record(
            PathBuf::from("bad.png"),
            Err(BatchError::MissingOutput(PathBuf::from("bad.jpg"))),
        );
        assert_eq!(failed.label(), "failed");
        assert!(failed.message().unwrap().contains("bad.jpg"));

        assert_eq!(report.files_processed(), 3);
        assert_eq!(report.files_written(), 1);
        assert_eq!(report.files_skipped(), 1);
        assert_eq!(report.errors(), 1);
        assert!(report.has_failures());

        let written: Vec<(&Path, &Path)> = report.written().collect();
        assert_eq!(written, vec![(Path::new("a.png"), Path::new("a.jpg"))]);

        let failures: Vec<&Path> = report.failures().map(|(path, _)| path).collect();
        assert_eq!(failures, vec![Path::new("bad.png")]);
    }

    #[test]
    fn test_skips_alone_are_not_failures() {
        let mut report = BatchReport::new();
        report.record(PathBuf::from("x.jpg"), Err(BatchError::InvalidStem("x.jpg".into())));
        report.record(PathBuf::from("1.jpg"), Ok(Outcome::Unchanged));
        assert!(!report.has_failures());
    }

    #[test]
    fn test_cleanup_failure_counts() {
        let mut report = BatchReport::new();
        report.record(PathBuf::from("7.jpg"), Ok(Outcome::Renamed { to: PathBuf::from("0007.jpg") }));
        assert_eq!(report.items[0].destination(), Some(Path::new("0007.jpg")));
        assert!(!report.has_failures());

        report.add_cleanup_failure(PathBuf::from("a.png"), &BatchError::MissingOutput(PathBuf::from("a.jpg")));
        assert!(report.has_failures());
        assert!(report.format_summary().contains("Cleanup errors: 1"));
    }

    #[test]
    fn test_item_serialization() {
        let item = ItemReport {
            path: PathBuf::from("a.png"),
            status: ItemStatus::Done {
                outcome: Outcome::Written {
                    output: PathBuf::from("a.jpg"),
                },
            },
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["status"]["status"], "done");
        assert_eq!(json["status"]["outcome"]["kind"], "written");
        assert_eq!(json["status"]["outcome"]["output"], "a.jpg");
    }
}

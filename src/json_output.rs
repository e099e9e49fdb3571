//! # JSON Output Module
//!
//! Output strutturato in JSON per chi guida `imgbatch` da un altro processo.
//! Un messaggio per riga su stdout; i log restano su stderr.
//!
//! ## Tipi di messaggi:
//! - `start`: inizio di un batch
//! - `file_complete`: fine elaborazione di un file
//! - `complete`: fine del batch con statistiche finali
//! - `error`: errore che interrompe il batch prima di iniziare

use crate::optimizer::report::{BatchReport, ItemReport};
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio del batch
    Start {
        operation: String,
        inputs: Vec<PathBuf>,
        total_files: usize,
        dry_run: bool,
    },

    /// Fine elaborazione di un file specifico
    FileComplete {
        path: PathBuf,
        index: usize,
        total: usize,
        result: String,
        destination: Option<PathBuf>,
        message: Option<String>,
    },

    /// Batch completato
    Complete {
        operation: String,
        files_processed: usize,
        files_written: usize,
        files_renamed: usize,
        files_unchanged: usize,
        files_planned: usize,
        files_skipped: usize,
        errors: usize,
        deleted: usize,
        cleanup_errors: usize,
        duration_seconds: f64,
    },

    /// Errore generale
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(operation: &str, inputs: &[PathBuf], total_files: usize, dry_run: bool) -> Self {
        Self::Start {
            operation: operation.to_string(),
            inputs: inputs.to_vec(),
            total_files,
            dry_run,
        }
    }

    /// Crea un messaggio di completamento file
    pub fn file_complete(item: &ItemReport, index: usize, total: usize) -> Self {
        Self::FileComplete {
            path: item.path.clone(),
            index,
            total,
            result: item.label().to_string(),
            destination: item.destination().map(PathBuf::from),
            message: item.message().map(str::to_string),
        }
    }

    /// Crea un messaggio di completamento generale
    pub fn complete(operation: &str, report: &BatchReport, duration_seconds: f64) -> Self {
        Self::Complete {
            operation: operation.to_string(),
            files_processed: report.files_processed(),
            files_written: report.files_written(),
            files_renamed: report.files_renamed(),
            files_unchanged: report.files_unchanged(),
            files_planned: report.files_planned(),
            files_skipped: report.files_skipped(),
            errors: report.errors(),
            deleted: report.deleted.len(),
            cleanup_errors: report.cleanup_failures.len(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

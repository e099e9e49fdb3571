//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore per-file dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `BatchError` per categorizzare gli errori di un singolo file
//! - Integra con `thiserror` per la conversione automatica da `io::Error` e `ImageError`
//! - Gli errori di setup (config, logging) restano `anyhow::Error`
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, rename falliti)
//! - `Image`: Immagine illeggibile o corrotta
//! - `ToolFailed`: Encoder esterno terminato con errore
//! - `MissingDependency`: Encoder esterno non trovato (cwebp, gif2webp)
//! - `MissingOutput`: Output non scritto nonostante il successo dichiarato
//! - `InvalidStem`: Nome file non numerico (zero-pad)
//! - `DestinationExists`: Il rename sovrascriverebbe un altro file
//! - `UnsupportedFormat`: Estensione di output non codificabile
//!
//! ## Esempio:
//! ```rust,ignore
//! if !output.exists() {
//!     return Err(BatchError::MissingOutput(output.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Errors raised while transforming a single target file
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{tool} failed on {input}: {status}")]
    ToolFailed {
        tool: String,
        input: PathBuf,
        status: String,
    },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Output was not written: {0}")]
    MissingOutput(PathBuf),

    #[error("Filename stem is not an integer: {0}")]
    InvalidStem(String),

    #[error("Refusing to overwrite existing file: {0}")]
    DestinationExists(PathBuf),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl BatchError {
    /// Errors that leave the item untouched without counting as a failure
    pub fn is_skip(&self) -> bool {
        matches!(self, BatchError::InvalidStem(_))
    }
}

//! # Image Batch Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Errori per-file (`BatchError`)
//! - `file_manager`: Scansione directory e operazioni sicure sui file
//! - `image_processor`: Decode/encode in-process e downscale
//! - `tool_resolver`, `external`: Encoder WebP esterni
//! - `cleanup`: Cancellazione sorgenti e sidecar dopo il batch
//! - `optimizer`: Orchestratore del batch
//! - `json_output`: Eventi JSON per l'uso da altri processi
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use image_batch::{BatchOptimizer, CommandEncoder, Config, ImageCrateCodec};
//! use std::path::PathBuf;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let codec = ImageCrateCodec::new(config.jpeg_quality);
//! let optimizer = BatchOptimizer::new(config, codec, CommandEncoder::default())?;
//! let report = optimizer.convert_to_jpg(&[PathBuf::from("scans")]).await;
//! println!("{}", report.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod config;
pub mod error;
pub mod external;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod optimizer;
pub mod tool_resolver;
pub mod utils;

pub use config::Config;
pub use error::BatchError;
pub use external::{CommandEncoder, ExternalEncoder};
pub use image_processor::{ImageCodec, ImageCrateCodec};
pub use optimizer::{BatchOptimizer, BatchReport, Operation};
pub use tool_resolver::ToolPathResolver;

//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `batch_optimizer`: Orchestratore di un batch
//! - `task_optimizer`: Worker per singoli file
//! - `report`: Esiti per file e statistiche del batch
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod batch_optimizer;
pub mod path_resolver;
pub mod report;
pub mod task_optimizer;

pub use batch_optimizer::BatchOptimizer;
pub use path_resolver::PathResolver;
pub use report::{BatchReport, ItemReport, ItemStatus, Outcome};
pub use task_optimizer::{Operation, TaskOptimizer};

//! # Batch Optimizer Main Orchestrator
//!
//! Orchestratore che risolve i target, delega ogni file al `TaskOptimizer`,
//! registra l'esito nel `BatchReport` e solo alla fine esegue il cleanup.
//!
//! ## Flusso di un batch:
//! 1. Risoluzione dei target (`PathResolver`)
//! 2. Elaborazione sequenziale: un errore resta confinato al proprio file
//! 3. Cleanup: cancellazione dei sorgenti con output verificato e dei sidecar
//! 4. Riepilogo (log o JSON) e report restituito al chiamante

use crate::{
    cleanup::Cleanup,
    config::Config,
    error::BatchError,
    external::ExternalEncoder,
    file_manager::{ScanDepth, TargetFile},
    image_processor::ImageCodec,
    json_output::JsonMessage,
    optimizer::{
        path_resolver::PathResolver,
        report::{BatchReport, ItemReport, ItemStatus},
        task_optimizer::{Operation, TaskOptimizer},
    },
};
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Orchestratore principale
pub struct BatchOptimizer<C, E> {
    task: TaskOptimizer<C, E>,
}

impl<C: ImageCodec, E: ExternalEncoder> BatchOptimizer<C, E> {
    /// Crea nuova istanza dell'ottimizzatore, validando la configurazione
    pub fn new(config: Config, codec: C, encoder: E) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            task: TaskOptimizer::new(config, codec, encoder),
        })
    }

    pub fn config(&self) -> &Config {
        &self.task.config
    }

    /// Converte PNG/TIFF/JPEG in `.jpg` (scansione non ricorsiva)
    pub async fn convert_to_jpg(&self, inputs: &[PathBuf]) -> BatchReport {
        let start_time = Instant::now();
        let config = self.config();
        let targets = PathResolver::resolve(inputs, &config.allow_lists.jpg, ScanDepth::Shallow);

        if let Some(ref output_path) = config.output_path {
            info!("Output directory: {}", output_path.display());
        }

        let mut report = self.run_batch(Operation::Jpg, inputs, &targets, &[]).await;

        if !config.dry_run {
            if config.delete_sources {
                Cleanup::delete_sources(&mut report).await;
            }
            if config.delete_identifiers {
                Cleanup::delete_identifiers(inputs, &mut report).await;
            }
        }

        self.finish(Operation::Jpg, &report, start_time);
        report
    }

    /// Ridimensiona sul posto le immagini troppo grandi (scansione ricorsiva)
    pub async fn shrink(&self, inputs: &[PathBuf]) -> BatchReport {
        let start_time = Instant::now();
        let config = self.config();
        if config.max_dim == 0 {
            info!("max_dim is 0: downscaling disabled");
        }

        let targets = PathResolver::resolve(inputs, &config.allow_lists.shrink, ScanDepth::Recursive);
        let report = self.run_batch(Operation::Shrink, inputs, &targets, &[]).await;

        self.finish(Operation::Shrink, &report, start_time);
        report
    }

    /// Rinomina con zeri iniziali gli stem numerici (scansione ricorsiva)
    pub async fn zero_pad(&self, inputs: &[PathBuf]) -> BatchReport {
        let start_time = Instant::now();
        let targets = PathResolver::resolve(inputs, &self.config().allow_lists.pad, ScanDepth::Recursive);
        let report = self.run_batch(Operation::Pad, inputs, &targets, &[]).await;

        self.finish(Operation::Pad, &report, start_time);
        report
    }

    /// Converte in WebP ogni file codificabile sotto `target_dir`.
    ///
    /// Il sorgente viene sempre cancellato dopo un successo verificato.
    pub async fn convert_to_webp(&self, target_dir: &Path, options: &[String]) -> BatchReport {
        let start_time = Instant::now();
        let config = self.config();
        let inputs = vec![target_dir.to_path_buf()];

        if !target_dir.is_dir() {
            let mut report = BatchReport::new();
            let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "target directory not found");
            let item = report.record(target_dir.to_path_buf(), Err(BatchError::Io(missing)));
            Self::log_item(Operation::Webp, item);
            self.finish(Operation::Webp, &report, start_time);
            return report;
        }

        let targets = PathResolver::resolve_encodable(target_dir, &config.webp_encoders);
        self.check_dependencies(&targets);
        if !options.is_empty() {
            debug!("Encoder options: {:?}", options);
        }

        let mut report = self.run_batch(Operation::Webp, &inputs, &targets, options).await;

        if !config.dry_run {
            Cleanup::delete_sources(&mut report).await;
        }

        self.finish(Operation::Webp, &report, start_time);
        report
    }

    /// Controlla gli encoder necessari prima di iniziare
    fn check_dependencies(&self, targets: &[TargetFile]) {
        let needed: BTreeSet<&str> = targets
            .iter()
            .filter_map(|target| self.config().webp_encoders.tool_for(&target.path))
            .collect();

        for tool in needed {
            if self.task.encoder().is_available(tool) {
                debug!("Encoder available: {}", tool);
            } else {
                warn!(
                    "⚠️ {} not found: files that need it will fail. Install the webp tools (e.g. `sudo apt-get install webp` or `brew install webp`)",
                    tool
                );
            }
        }
    }

    /// Elabora i target uno alla volta, registrando ogni esito
    async fn run_batch(
        &self,
        operation: Operation,
        inputs: &[PathBuf],
        targets: &[TargetFile],
        options: &[String],
    ) -> BatchReport {
        let config = self.config();
        let total = targets.len();

        if config.json_output {
            JsonMessage::start(operation.name(), inputs, total, config.dry_run).emit();
        }
        if total == 0 {
            info!("No files found for {}", operation);
        } else {
            info!("🚀 {}: {} file(s) to process", operation, total);
        }
        if config.dry_run {
            info!("Dry run mode: No files will be modified");
        }

        let sources: HashSet<&Path> = targets.iter().map(|target| target.path.as_path()).collect();
        let mut claimed = HashMap::new();

        let mut report = BatchReport::new();
        for (index, target) in targets.iter().enumerate() {
            let result = match self.claim_output(operation, target, &sources, &mut claimed) {
                Err(e) => Err(e),
                Ok(()) if config.dry_run => self.task.plan(operation, target),
                Ok(()) => self.task.process(operation, target, options).await,
            };

            let item = report.record(target.path.clone(), result);
            Self::log_item(operation, item);
            if config.json_output {
                JsonMessage::file_complete(item, index, total).emit();
            }
        }
        report
    }

    /// Un output appartiene a un solo sorgente del batch.
    ///
    /// Rifiuta il target se il suo output è già stato preso da un altro
    /// sorgente (`photo.png` e `photo.PNG` -> `photo.jpg`) o se coincide con
    /// un altro sorgente ancora da elaborare.
    fn claim_output(
        &self,
        operation: Operation,
        target: &TargetFile,
        sources: &HashSet<&Path>,
        claimed: &mut HashMap<PathBuf, PathBuf>,
    ) -> Result<(), BatchError> {
        let Some(output) = self.task.output_path(operation, target) else {
            return Ok(());
        };
        if output != target.path && sources.contains(output.as_path()) {
            return Err(BatchError::DestinationExists(output));
        }
        match claimed.get(&output) {
            Some(owner) if *owner != target.path => Err(BatchError::DestinationExists(output)),
            Some(_) => Ok(()),
            None => {
                claimed.insert(output, target.path.clone());
                Ok(())
            }
        }
    }

    fn log_item(operation: Operation, item: &ItemReport) {
        let path = item.path.display();
        match &item.status {
            ItemStatus::Done { .. } => match item.destination() {
                Some(destination) => info!("✅ {} {} -> {}", item.label(), path, destination.display()),
                None => debug!("{} {}", item.label(), path),
            },
            ItemStatus::Skipped { reason } => warn!("⏭️ Skipped {}: {}", path, reason),
            ItemStatus::Failed { error } => error!("❌ {} failed for: {}: {}", operation, path, error),
        }
    }

    /// Riepilogo finale: log o messaggio JSON `complete`
    fn finish(&self, operation: Operation, report: &BatchReport, start_time: Instant) {
        let elapsed = start_time.elapsed();

        for (path, error) in &report.cleanup_failures {
            error!("Cleanup failed for: {}: {}", path.display(), error);
        }
        info!("📊 {} | {:.2}s", report.format_summary(), elapsed.as_secs_f64());

        if self.config().json_output {
            JsonMessage::complete(operation.name(), report, elapsed.as_secs_f64()).emit();
        }
    }
}

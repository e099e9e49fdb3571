//! # Task Optimizer Module
//!
//! Worker per la trasformazione di singoli file.
//! Ogni operazione restituisce un `Outcome` o un `BatchError`; non tocca mai
//! altri file e non cancella nulla (la cancellazione è compito del cleanup).

use crate::{
    config::Config,
    error::BatchError,
    external::ExternalEncoder,
    file_manager::{FileManager, TargetFile},
    image_processor::{downscale, to_rgb, ImageCodec},
    optimizer::{path_resolver::PathResolver, report::Outcome},
};
use image::DynamicImage;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// The four batch transformations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Re-encode to `.jpg`
    Jpg,
    /// Re-encode to `.webp` with an external encoder
    Webp,
    /// Downscale oversized images in place
    Shrink,
    /// Rename numeric stems with zero padding
    Pad,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Jpg => "jpg",
            Operation::Webp => "webp",
            Operation::Shrink => "shrink",
            Operation::Pad => "pad",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Worker per elaborazione singoli file
pub struct TaskOptimizer<C, E> {
    pub config: Config,
    codec: C,
    encoder: E,
}

impl<C: ImageCodec, E: ExternalEncoder> TaskOptimizer<C, E> {
    /// Crea nuovo task optimizer
    pub fn new(config: Config, codec: C, encoder: E) -> Self {
        Self {
            config,
            codec,
            encoder,
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Nuovo file che `operation` scrive per `target`, se ne scrive uno
    pub fn output_path(&self, operation: Operation, target: &TargetFile) -> Option<PathBuf> {
        match operation {
            Operation::Jpg => Some(PathResolver::jpg_output_path(target, self.config.output_path.as_deref())),
            Operation::Webp => Some(PathResolver::webp_output_path(target)),
            Operation::Shrink | Operation::Pad => None,
        }
    }

    /// Applica `operation` a un singolo file
    pub async fn process(
        &self,
        operation: Operation,
        target: &TargetFile,
        options: &[String],
    ) -> Result<Outcome, BatchError> {
        match operation {
            Operation::Jpg => self.convert_to_jpg(target).await,
            Operation::Webp => self.convert_to_webp(target, options).await,
            Operation::Shrink => self.shrink(target).await,
            Operation::Pad => self.zero_pad(target).await,
        }
    }

    /// Dry run: cosa farebbe `process` senza toccare il disco
    pub fn plan(&self, operation: Operation, target: &TargetFile) -> Result<Outcome, BatchError> {
        match operation {
            Operation::Pad => {
                let destination = PathResolver::padded_path(target, self.config.pad_width)?;
                if destination == target.path {
                    Ok(Outcome::Unchanged)
                } else {
                    Ok(Outcome::Planned)
                }
            }
            Operation::Webp if self.config.webp_encoders.tool_for(&target.path).is_none() => {
                Err(BatchError::UnsupportedFormat(target.path.display().to_string()))
            }
            _ => Ok(Outcome::Planned),
        }
    }

    /// Decodifica, forza RGB e salva `<stem>.jpg`
    pub async fn convert_to_jpg(&self, target: &TargetFile) -> Result<Outcome, BatchError> {
        let output = PathResolver::jpg_output_path(target, self.config.output_path.as_deref());
        let image = self.codec.decode(&target.path)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.codec.encode(&DynamicImage::ImageRgb8(to_rgb(image)), &output)?;
        Ok(Outcome::Written { output })
    }

    /// Lancia l'encoder esterno e verifica che il `.webp` esista davvero
    pub async fn convert_to_webp(&self, target: &TargetFile, options: &[String]) -> Result<Outcome, BatchError> {
        let tool = self
            .config
            .webp_encoders
            .tool_for(&target.path)
            .ok_or_else(|| BatchError::UnsupportedFormat(target.path.display().to_string()))?;
        let output = PathResolver::webp_output_path(target);

        self.encoder.encode(tool, options, &target.path, &output).await?;
        FileManager::verify_written(&output).await?;
        Ok(Outcome::Written { output })
    }

    /// Ridimensiona sul posto solo se il lato lungo supera `max_dim`
    pub async fn shrink(&self, target: &TargetFile) -> Result<Outcome, BatchError> {
        let image = to_rgb(self.codec.decode(&target.path)?);

        match downscale(&image, self.config.max_dim) {
            Some(resized) => {
                self.codec.encode(&DynamicImage::ImageRgb8(resized), &target.path)?;
                Ok(Outcome::Written {
                    output: target.path.clone(),
                })
            }
            None => {
                debug!("{} already within {}px", target.path.display(), self.config.max_dim);
                Ok(Outcome::Unchanged)
            }
        }
    }

    /// Rinomina con stem numerico a `pad_width` cifre
    pub async fn zero_pad(&self, target: &TargetFile) -> Result<Outcome, BatchError> {
        let destination = PathResolver::padded_path(target, self.config.pad_width)?;
        if destination == target.path {
            return Ok(Outcome::Unchanged);
        }

        FileManager::rename_no_clobber(&target.path, &destination).await?;
        Ok(Outcome::Renamed { to: destination })
    }
}

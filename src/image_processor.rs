//! # Image Processing Module
//!
//! Decode, RGB normalisation, proportional downscale and encode of images in
//! process, through the `image` crate.
//!
//! The codec sits behind the `ImageCodec` trait so the optimizer can be driven
//! with a fake in tests. The real implementation, `ImageCrateCodec`:
//!
//! - sniffs the input format from the file content, not the extension
//! - picks the output format from the destination extension
//! - encodes JPEG with the configured quality (75 unless overridden)
//! - writes atomically: temp file in the destination directory, `fsync`, rename
//!
//! ## Downscale
//!
//! ```text
//! scale = max_dim / max(width, height)      (only when the longer side exceeds max_dim)
//! new   = (trunc(width * scale), trunc(height * scale)), each at least 1
//! ```
//! Resampling uses Lanczos3. Images already within bounds are never re-encoded.

use crate::error::BatchError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageOutputFormat, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Image decode/encode capability
pub trait ImageCodec {
    /// Decode the image stored at `path`
    fn decode(&self, path: &Path) -> Result<DynamicImage, BatchError>;

    /// Encode `image` to `path`, format chosen by the path's extension.
    /// On success the file is fully written; on failure `path` is untouched.
    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), BatchError>;
}

/// `ImageCodec` backed by the `image` crate
#[derive(Debug, Clone)]
pub struct ImageCrateCodec {
    jpeg_quality: u8,
}

impl ImageCrateCodec {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    fn output_format(&self, path: &Path) -> Result<ImageOutputFormat, BatchError> {
        let format = ImageFormat::from_path(path)
            .map_err(|_| BatchError::UnsupportedFormat(path.display().to_string()))?;
        let output = match format {
            ImageFormat::Jpeg => ImageOutputFormat::Jpeg(self.jpeg_quality),
            other => ImageOutputFormat::from(other),
        };
        if let ImageOutputFormat::Unsupported(name) = &output {
            return Err(BatchError::UnsupportedFormat(name.clone()));
        }
        Ok(output)
    }
}

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BatchError> {
        let image = image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()?;
        debug!("Decoded {} ({}x{})", path.display(), image.width(), image.height());
        Ok(image)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), BatchError> {
        let format = self.output_format(path)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".imgbatch-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            image.write_to(&mut writer, format)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        debug!("Encoded {}", path.display());
        Ok(())
    }
}

/// Force 3-channel 8-bit colour, dropping alpha and palettes
pub fn to_rgb(image: DynamicImage) -> RgbImage {
    image.into_rgb8()
}

/// Target size for a proportional downscale, `None` if no resize is needed.
///
/// `max_dim == 0` disables downscaling.
pub fn scaled_dimensions(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    if max_dim == 0 || longer <= max_dim {
        return None;
    }

    let scale = max_dim as f64 / longer as f64;
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    Some((new_width, new_height))
}

/// Downscale an RGB image so its longer side fits `max_dim`.
/// Returns `None` when the image is already within bounds.
pub fn downscale(image: &RgbImage, max_dim: u32) -> Option<RgbImage> {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, max_dim)?;
    debug!("Resizing {}x{} -> {}x{}", width, height, new_width, new_height);
    Some(image::imageops::resize(image, new_width, new_height, FilterType::Lanczos3))
}

//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri di ogni trasformazione
//! - Definisce le allow-list di estensioni per ogni tipo di trasformazione
//! - Definisce la tabella estensione → encoder esterno per la conversione WebP
//! - Fornisce validazione dei parametri e caricamento/salvataggio da file JSON
//!
//! ## Parametri di configurazione:
//! - `jpeg_quality`: Qualità JPEG (1-100, default: 75, come la libreria)
//! - `max_dim`: Lato lungo massimo per `shrink` (default: 1920, 0 = disabilitato)
//! - `pad_width`: Cifre minime per `pad` (default: 4)
//! - `delete_sources`: Cancella i sorgenti dopo la conversione JPG (default: true)
//! - `delete_identifiers`: Cancella i file `*.Identifier` (default: true)
//! - `output_path`: Directory di output per `jpg` (default: None = accanto al sorgente)
//! - `dry_run`: Nessuna modifica su disco (default: false)
//! - `json_output`: Eventi JSON su stdout (default: false)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     max_dim: 2560,
//!     pad_width: 6,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Largest accepted `pad_width`
const MAX_PAD_WIDTH: usize = 64;

/// Ordered, case-sensitive list of filename suffixes eligible for an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList(Vec<String>);

impl AllowList {
    pub fn new<T, I>(suffixes: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = T>,
    {
        Self(suffixes.into_iter().map(Into::into).collect())
    }

    pub fn suffixes(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Exact, case-sensitive suffix match on the file name
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// Allow-lists for the transformations that resolve files by suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowLists {
    pub jpg: AllowList,
    pub shrink: AllowList,
    pub pad: AllowList,
}

impl Default for AllowLists {
    fn default() -> Self {
        let jpeg_family = [".jpg", ".jpeg", ".JPG", ".JPEG"];
        Self {
            // `.jpg` is missing on purpose: it is the output suffix
            jpg: AllowList::new([
                ".png", ".PNG", ".tiff", ".TIFF", ".tif", ".TIF", ".jpeg", ".JPEG", ".JPG",
            ]),
            shrink: AllowList::new(jpeg_family),
            pad: AllowList::new(jpeg_family),
        }
    }
}

/// Extension (lower-case, with dot) → external WebP encoder.
///
/// A `None` entry excludes the extension explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderTable(BTreeMap<String, Option<String>>);

impl EncoderTable {
    pub const CWEBP: &'static str = "cwebp";
    pub const GIF2WEBP: &'static str = "gif2webp";

    pub fn new(entries: BTreeMap<String, Option<String>>) -> Self {
        Self(entries)
    }

    /// Encoder for a file, looked up by its lower-cased extension.
    /// WebP files never get one, whatever the table says.
    pub fn tool_for(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if ext == "webp" {
            return None;
        }
        self.0.get(&format!(".{}", ext)).and_then(|tool| tool.as_deref())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Option<String>)> {
        self.0.iter()
    }
}

impl Default for EncoderTable {
    fn default() -> Self {
        let photographic = [
            ".png", ".jpeg", ".jpg", ".jpe", ".jif", ".jfif", ".jfi", ".jp2", ".j2k", ".jpf",
            ".jpx", ".jpm", ".mj2", ".tiff",
        ];
        let mut entries: BTreeMap<String, Option<String>> = photographic
            .iter()
            .map(|ext| (ext.to_string(), Some(Self::CWEBP.to_string())))
            .collect();
        entries.insert(".gif".to_string(), Some(Self::GIF2WEBP.to_string()));
        entries.insert(".webp".to_string(), None);
        Self(entries)
    }
}

/// Configuration for batch image maintenance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Longest side allowed by `shrink` (0 disables downscaling)
    pub max_dim: u32,
    /// Minimum digits of a zero-padded stem
    pub pad_width: usize,
    /// Delete converted sources once their JPG is verified
    pub delete_sources: bool,
    /// Delete `*.Identifier` sidecar files in input directories
    pub delete_identifiers: bool,
    /// Output directory for JPG conversion (None = next to the source)
    pub output_path: Option<PathBuf>,
    /// Dry run - resolve and report only
    pub dry_run: bool,
    /// Output per-file results and summary as JSON on stdout
    pub json_output: bool,
    pub allow_lists: AllowLists,
    pub webp_encoders: EncoderTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            max_dim: 1920,
            pad_width: 4,
            delete_sources: true,
            delete_identifiers: true,
            output_path: None,
            dry_run: false,
            json_output: false,
            allow_lists: AllowLists::default(),
            webp_encoders: EncoderTable::default(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(anyhow::anyhow!("JPEG quality must be between 1 and 100"));
        }

        if self.pad_width > MAX_PAD_WIDTH {
            return Err(anyhow::anyhow!("Pad width must be at most {}", MAX_PAD_WIDTH));
        }

        for (name, list) in [
            ("jpg", &self.allow_lists.jpg),
            ("shrink", &self.allow_lists.shrink),
            ("pad", &self.allow_lists.pad),
        ] {
            if list.is_empty() {
                return Err(anyhow::anyhow!("Allow-list '{}' is empty", name));
            }
            if let Some(bad) = list.suffixes().iter().find(|s| s.len() < 2 || !s.starts_with('.')) {
                return Err(anyhow::anyhow!("Invalid suffix '{}' in allow-list '{}'", bad, name));
            }
        }

        for (ext, tool) in self.webp_encoders.entries() {
            if !ext.starts_with('.') || ext.len() < 2 || *ext != ext.to_lowercase() {
                return Err(anyhow::anyhow!(
                    "WebP encoder keys must be lower-case extensions with a leading dot: '{}'",
                    ext
                ));
            }
            match tool {
                Some(_) if ext == ".webp" => {
                    return Err(anyhow::anyhow!("WebP files cannot be mapped to an encoder"));
                }
                Some(tool) if tool.trim().is_empty() => {
                    return Err(anyhow::anyhow!("Empty encoder name for '{}'", ext));
                }
                _ => {}
            }
        }

        if let Some(ref output_path) = self.output_path {
            if output_path.exists() && !output_path.is_dir() {
                return Err(anyhow::anyhow!("Output path is not a directory: {}", output_path.display()));
            }
        }

        Ok(())
    }

    /// Default config location: `<config dir>/imgbatch/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("imgbatch").join("config.json"))
    }

    /// Load configuration from file (defaults if the file does not exist)
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or the default location, or defaults
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => {
                Err(anyhow::anyhow!("Config file does not exist: {}", path.display()))
            }
            Some(path) => Self::from_file(path).await,
            None => match Self::default_path() {
                Some(path) => Self::from_file(&path).await,
                None => Ok(Self::default()),
            },
        }
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.max_dim, 1920);
        assert_eq!(config.pad_width, 4);
        assert!(config.delete_sources);
        assert!(config.delete_identifiers);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.jpeg_quality = 0;
        assert!(config.validate().is_err());

        config.jpeg_quality = 90;
        config.pad_width = 65;
        assert!(config.validate().is_err());

        config.pad_width = 4;
        config.allow_lists.pad = AllowList::new(["jpg"]);
        assert!(config.validate().is_err());

        config.allow_lists.pad = AllowList::new(Vec::<String>::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_webp_cannot_map_to_encoder() {
        let mut entries = BTreeMap::new();
        entries.insert(".webp".to_string(), Some("cwebp".to_string()));
        let config = Config {
            webp_encoders: EncoderTable::new(entries),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_encoder_keys_must_be_lowercase() {
        let mut entries = BTreeMap::new();
        entries.insert(".PNG".to_string(), Some("cwebp".to_string()));
        let config = Config {
            webp_encoders: EncoderTable::new(entries),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        assert!(has_suffix(Path::new("/a/x.png"), ".png"));
        assert!(has_suffix(Path::new("/a/x.PNG"), ".PNG"));
        assert!(!has_suffix(Path::new("/a/x.Png"), ".png"));
        assert!(!has_suffix(Path::new("/a/x.png.txt"), ".png"));
    }

    #[test]
    fn test_encoder_table_lookup() {
        let table = EncoderTable::default();
        assert_eq!(table.tool_for(Path::new("a.PNG")), Some("cwebp"));
        assert_eq!(table.tool_for(Path::new("a.jfif")), Some("cwebp"));
        assert_eq!(table.tool_for(Path::new("a.GIF")), Some("gif2webp"));
        assert_eq!(table.tool_for(Path::new("a.webp")), None);
        assert_eq!(table.tool_for(Path::new("a.tif")), None);
        assert_eq!(table.tool_for(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let original_config = Config {
            jpeg_quality: 90,
            max_dim: 1024,
            pad_width: 6,
            delete_sources: false,
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.jpeg_quality, 90);
        assert_eq!(loaded_config.max_dim, 1024);
        assert_eq!(loaded_config.pad_width, 6);
        assert!(!loaded_config.delete_sources);
        assert_eq!(loaded_config.allow_lists, AllowLists::default());
        assert_eq!(loaded_config.webp_encoders, EncoderTable::default());
    }

    #[tokio::test]
    async fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{"max_dim": 800, "allow_lists": {"pad": [".png"]}}"#)
            .await
            .unwrap();

        let config = Config::from_file(&config_path).await.unwrap();
        assert_eq!(config.max_dim, 800);
        assert_eq!(config.pad_width, 4);
        assert_eq!(config.allow_lists.pad, AllowList::new([".png"]));
        assert_eq!(config.allow_lists.jpg, AllowLists::default().jpg);
    }

    #[tokio::test]
    async fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(Config::load(Some(missing.as_path())).await.is_err());
        // Without an explicit path a missing file means defaults
        assert_eq!(Config::from_file(&missing).await.unwrap().max_dim, 1920);
    }
}

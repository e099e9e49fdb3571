//! # Path Resolution Module
//!
//! Centralizza l'espansione degli input in file target e il calcolo dei path
//! di output, così le trasformazioni non duplicano la logica.

use crate::{
    config::{has_suffix, AllowList, EncoderTable},
    error::BatchError,
    file_manager::{FileManager, ScanDepth, TargetFile},
    utils::{canonical_integer, zero_pad},
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Utility per risolvere input e path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Espande gli input in una lista ordinata di target.
    ///
    /// - un file esistente è incluso sempre, qualunque sia l'estensione
    /// - una directory è scansionata una volta per suffisso, nell'ordine dell'allow-list
    /// - tutto il resto viene saltato
    ///
    /// Nessuna deduplicazione: un file che corrisponde a due suffissi compare due volte.
    pub fn resolve(inputs: &[PathBuf], allow_list: &AllowList, depth: ScanDepth) -> Vec<TargetFile> {
        let mut targets = Vec::new();

        for input in inputs {
            if input.is_file() {
                targets.push(TargetFile::new(input.clone()));
                continue;
            }
            if !input.is_dir() {
                warn!("Skipping input {}: not a file or directory", input.display());
                continue;
            }

            let files = FileManager::list_files(input, depth);
            for suffix in allow_list.suffixes() {
                targets.extend(
                    files
                        .iter()
                        .filter(|path| has_suffix(path, suffix))
                        .map(|path| TargetFile::new(path.clone())),
                );
            }
        }

        debug!("Resolved {} target(s) from {} input(s)", targets.len(), inputs.len());
        targets
    }

    /// Walk `root` ricorsivamente e seleziona i file con un encoder WebP
    pub fn resolve_encodable(root: &Path, table: &EncoderTable) -> Vec<TargetFile> {
        FileManager::list_files(root, ScanDepth::Recursive)
            .into_iter()
            .filter(|path| table.tool_for(path).is_some())
            .map(TargetFile::new)
            .collect()
    }

    /// `<output_dir o directory del sorgente>/<stem>.jpg`
    pub fn jpg_output_path(target: &TargetFile, output_dir: Option<&Path>) -> PathBuf {
        let filename = format!("{}.jpg", target.stem);
        match output_dir {
            Some(dir) => dir.join(filename),
            None => target.sibling(&filename),
        }
    }

    /// `<directory del sorgente>/<stem>.webp`
    pub fn webp_output_path(target: &TargetFile) -> PathBuf {
        target.sibling(&format!("{}.webp", target.stem))
    }

    /// `<directory del sorgente>/<stem con zeri><suffisso>`
    pub fn padded_path(target: &TargetFile, width: usize) -> Result<PathBuf, BatchError> {
        let value = canonical_integer(&target.stem)
            .ok_or_else(|| BatchError::InvalidStem(target.path.display().to_string()))?;
        Ok(target.sibling(&format!("{}{}", zero_pad(&value, width), target.suffix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllowLists;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_resolve_filters_by_allow_list() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.png"));
        touch(&root.join("b.PNG"));
        touch(&root.join("c.txt"));

        let targets = PathResolver::resolve(
            &[root.to_path_buf()],
            &AllowLists::default().jpg,
            ScanDepth::Shallow,
        );
        let names: Vec<&str> = targets.iter().map(|t| t.stem.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(targets[1].suffix, ".PNG");
    }

    #[test]
    fn test_resolve_orders_by_suffix_then_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("z.jpg"));
        touch(&root.join("a.JPG"));
        touch(&root.join("m.jpg"));

        let list = AllowList::new([".jpg", ".JPG"]);
        let targets = PathResolver::resolve(&[root.to_path_buf()], &list, ScanDepth::Shallow);
        let paths: Vec<PathBuf> = targets.into_iter().map(|t| t.path).collect();
        assert_eq!(paths, vec![root.join("m.jpg"), root.join("z.jpg"), root.join("a.JPG")]);
    }

    #[test]
    fn test_resolve_depth() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("top.jpg"));
        touch(&root.join("nested").join("deep.jpg"));
        let list = AllowLists::default().shrink;

        let shallow = PathResolver::resolve(&[root.to_path_buf()], &list, ScanDepth::Shallow);
        assert_eq!(shallow.len(), 1);

        let recursive = PathResolver::resolve(&[root.to_path_buf()], &list, ScanDepth::Recursive);
        assert_eq!(recursive.len(), 2);
    }

    #[test]
    fn test_resolve_explicit_file_and_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let notes = temp_dir.path().join("notes.txt");
        touch(&notes);
        let missing = temp_dir.path().join("missing");

        let inputs = vec![missing, notes.clone(), notes.clone()];
        let targets = PathResolver::resolve(&inputs, &AllowLists::default().jpg, ScanDepth::Shallow);
        // Explicit files bypass the allow-list and are not deduplicated
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.path == notes));
    }

    #[test]
    fn test_resolve_encodable_skips_webp_and_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.PNG"));
        touch(&root.join("b.webp"));
        touch(&root.join("c.txt"));
        touch(&root.join("sub").join("d.gif"));

        let targets = PathResolver::resolve_encodable(root, &EncoderTable::default());
        let paths: Vec<PathBuf> = targets.into_iter().map(|t| t.path).collect();
        assert_eq!(paths, vec![root.join("a.PNG"), root.join("sub").join("d.gif")]);
    }

    #[test]
    fn test_output_paths() {
        let target = TargetFile::new("/in/photo.PNG");
        assert_eq!(PathResolver::jpg_output_path(&target, None), PathBuf::from("/in/photo.jpg"));
        assert_eq!(
            PathResolver::jpg_output_path(&target, Some(Path::new("/out"))),
            PathBuf::from("/out/photo.jpg")
        );
        assert_eq!(PathResolver::webp_output_path(&target), PathBuf::from("/in/photo.webp"));
    }

    #[test]
    fn test_padded_path() {
        let padded = PathResolver::padded_path(&TargetFile::new("/in/7.jpg"), 4).unwrap();
        assert_eq!(padded, PathBuf::from("/in/0007.jpg"));

        let long = PathResolver::padded_path(&TargetFile::new("/in/12345.jpg"), 4).unwrap();
        assert_eq!(long, PathBuf::from("/in/12345.jpg"));

        let stripped = PathResolver::padded_path(&TargetFile::new("/in/00007.JPEG"), 4).unwrap();
        assert_eq!(stripped, PathBuf::from("/in/0007.JPEG"));

        let err = PathResolver::padded_path(&TargetFile::new("/in/abc.jpg"), 4).unwrap_err();
        assert!(matches!(err, BatchError::InvalidStem(_)));
    }

    #[test]
    fn test_padded_path_accepts_any_integer_spelling() {
        let underscored = PathResolver::padded_path(&TargetFile::new("/in/1_000.jpg"), 6).unwrap();
        assert_eq!(underscored, PathBuf::from("/in/001000.jpg"));

        let spaced = PathResolver::padded_path(&TargetFile::new("/in/ 7.jpg"), 4).unwrap();
        assert_eq!(spaced, PathBuf::from("/in/0007.jpg"));

        let stem = "9".repeat(40);
        let huge = PathResolver::padded_path(&TargetFile::new(format!("/in/{}.jpg", stem)), 4).unwrap();
        assert_eq!(huge, PathBuf::from(format!("/in/{}.jpg", stem)));

        for name in ["1__0.jpg", "_1.jpg", "1_.jpg"] {
            let err = PathResolver::padded_path(&TargetFile::new(format!("/in/{}", name)), 4).unwrap_err();
            assert!(matches!(err, BatchError::InvalidStem(_)), "{}", name);
        }
    }
}

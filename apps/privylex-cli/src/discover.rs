use std::path::{Path, PathBuf};

use privylex_core::DocumentFormat;
use tracing::debug;
use walkdir::WalkDir;

/// A supported file found under the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    /// Path relative to the input root, `/`-separated. Used as the document id.
    pub rel_id: String,
    pub file_name: String,
    pub format: DocumentFormat,
}

/// Walk `root` recursively and keep `.pdf`, `.docx` and `.doc` files, sorted by path.
///
/// Symlinks to files are kept; symlinked directories are not descended into.
/// A missing or unreadable root yields nothing.
pub fn discover(root: &Path) -> Vec<InputFile> {
    let mut files: Vec<InputFile> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file()))
        .filter_map(|e| {
            let path = e.into_path();
            let Some(format) = DocumentFormat::from_path(&path) else {
                debug!(path = %path.display(), "ignoring unsupported file");
                return None;
            };
            let rel = path.strip_prefix(root).unwrap_or(&path);
            let rel_id = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
            let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| rel_id.clone());
            Some(InputFile { path, rel_id, file_name, format })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

use crate::{LineIndex, SourceError, SourceResult};
use std::fs;
use std::path::{Path, PathBuf};

/// A source file handed to the compiler.
///
/// # Example
///
/// ```rust
/// use mtm_source::SourceFile;
///
/// let file = SourceFile::new("Counter.mtm", "$count! = 0");
/// assert_eq!(file.stem(), Some("Counter"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path used in diagnostics
    path: PathBuf,

    /// Raw text content of the file
    contents: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Reads an `.mtm` file from disk.
    pub fn load(path: &Path) -> SourceResult<Self> {
        if !path.exists() {
            return Err(SourceError::PathNotFound(path.to_path_buf()));
        }
        if path.extension().map_or(true, |ext| ext != "mtm") {
            return Err(SourceError::InvalidExtension(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|source| SourceError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded {} ({} bytes)", path.display(), contents.len());
        Ok(Self::new(path, contents))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path as shown in diagnostics.
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// File name without the extension.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }

    pub fn line_index(&self) -> LineIndex<'_> {
        LineIndex::new(&self.contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Counter.jsx");
        fs::write(&path, "").unwrap();
        assert!(matches!(SourceFile::load(&path), Err(SourceError::InvalidExtension(_))));
    }

    #[test]
    fn test_load_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Counter.mtm");
        fs::write(&path, "$count! = 0\n").unwrap();
        let file = SourceFile::load(&path).unwrap();
        assert_eq!(file.contents(), "$count! = 0\n");
        assert_eq!(file.stem(), Some("Counter"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SourceFile::load(Path::new("/definitely/not/here.mtm"));
        assert!(matches!(result, Err(SourceError::PathNotFound(_))));
    }
}

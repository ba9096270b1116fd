use crate::{SourceError, SourceResult, Target};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up next to components.
pub const CONFIG_FILE_NAME: &str = "mtm.toml";

/// Contents of `mtm.toml`.
///
/// Every section is optional; a missing file behaves like `CompilerConfig::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compilation settings
    pub compiler: CompilerSection,

    /// Diagnostic rendering settings
    pub diagnostics: DiagnosticsSection,

    /// Output settings
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSection {
    /// Target used when a component's frontmatter does not name one
    pub default_target: Target,

    /// Treat type diagnostics with severity `error` as compile failures
    pub strict_types: bool,

    /// Module that provides `signals` for frontmatter channels
    pub runtime_module: String,
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            default_target: Target::React,
            strict_types: false,
            runtime_module: "@mtm/runtime".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSection {
    /// Source lines shown before the offending line
    pub lines_before: usize,

    /// Source lines shown after the offending line
    pub lines_after: usize,

    /// Lines shown on each side for statement-boundary ambiguities
    pub asi_lines: usize,
}

impl Default for DiagnosticsSection {
    fn default() -> Self {
        Self {
            lines_before: 2,
            lines_after: 2,
            asi_lines: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory generated components are written to
    pub out_dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("dist"),
        }
    }
}

impl CompilerConfig {
    /// Parses configuration text; `path` is only used for error reporting.
    pub fn from_toml(content: &str, path: &Path) -> SourceResult<Self> {
        toml::from_str(content).map_err(|err| SourceError::ConfigParseError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn load(path: &Path) -> SourceResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| SourceError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    pub fn to_toml(&self) -> SourceResult<String> {
        toml::to_string_pretty(self).map_err(|err| SourceError::ConfigSerializeError(err.to_string()))
    }

    /// Searches `start` and its ancestors for `mtm.toml`.
    ///
    /// Returns the directory holding the file together with the parsed
    /// config, or `None` when no configuration exists up to the
    /// filesystem root.
    pub fn discover(start: &Path) -> SourceResult<Option<(PathBuf, CompilerConfig)>> {
        let mut current = if start.is_dir() {
            start.to_path_buf()
        } else {
            start.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        };

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                log::debug!("Using configuration {}", candidate.display());
                let config = Self::load(&candidate)?;
                return Ok(Some((current, config)));
            }
            if !current.pop() {
                return Ok(None);
            }
        }
    }
}

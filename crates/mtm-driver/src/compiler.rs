use crate::{DriverError, DriverResult};
use mtm_codegen::{transformer_for, GeneratedCode, TransformOptions, Transformed};
use mtm_diagnostics::{
    CategorizedError, CompilationError, CompilationErrorKind, ErrorCategorizer, ErrorContext, ErrorHandler,
    render_context,
};
use mtm_source::{CompilerConfig, LineIndex, SourceFile, Target};
use mtm_syntax::{detect_syntax_version, parse_file, split_frontmatter, SyntaxError, SyntaxVersion, UnifiedAst};
use mtm_types::{TypeErrorHandler, TypeErrorInfo};
use serde::Serialize;
use std::any::Any;
use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Everything one compilation of one component for one target produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileOutput {
    pub file: String,
    pub target: Target,
    pub syntax_version: SyntaxVersion,
    /// The generated component, or the untouched body of a legacy file.
    /// `None` when compilation failed.
    pub code: Option<String>,
    /// Per-section output of the transformer; `None` for legacy files
    pub generated: Option<GeneratedCode>,
    /// Type diagnostics, including the advisory ones
    pub diagnostics: Vec<TypeErrorInfo>,
    /// Parse failures mapped onto modern-syntax categories
    pub categorized: Vec<CategorizedError>,
    pub errors: Vec<CompilationError>,
}

impl CompileOutput {
    fn failed(file: &SourceFile, target: Target, syntax_version: SyntaxVersion) -> Self {
        Self {
            file: file.display_name(),
            target,
            syntax_version,
            code: None,
            generated: None,
            diagnostics: Vec::new(),
            categorized: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_some() && self.errors.is_empty()
    }
}

/// A parsed and type-checked component, ready to be lowered to any target.
struct Checked {
    ast: UnifiedAst,
    diagnostics: Vec<TypeErrorInfo>,
    /// Type errors that stop a strict compile
    blocking: Vec<CompilationError>,
}

/// A component that did not parse.
struct ParseFailure {
    declared_target: Option<Target>,
    syntax_version: SyntaxVersion,
    categorized: Option<CategorizedError>,
    error: CompilationError,
}

/// Runs components through parse, type check and transform.
///
/// Failures are reported to the [`ErrorHandler`] passed to each call as
/// well as returned in the [`CompileOutput`].
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
    categorizer: ErrorCategorizer,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        let categorizer = ErrorCategorizer::new(config.diagnostics.clone());
        Self { config, categorizer }
    }

    /// Uses the `mtm.toml` nearest to `path`, or the defaults if there is
    /// none.
    pub fn discover(path: &Path) -> DriverResult<Self> {
        let config = CompilerConfig::discover(path)?.map(|(_, config)| config).unwrap_or_default();
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles `file` for the target its frontmatter names, falling back
    /// to the configured default target.
    pub fn compile(&self, file: &SourceFile, sink: &mut ErrorHandler) -> CompileOutput {
        let default = self.config.compiler.default_target;
        match self.check(file, sink) {
            Ok(checked) => {
                let target = checked.ast.frontmatter().target.unwrap_or(default);
                self.lower(file, &checked, target, sink)
            }
            Err(failure) => failure.output(file, None, default),
        }
    }

    /// Compiles `file` for each of `targets`, parsing and checking it once.
    pub fn compile_targets(&self, file: &SourceFile, targets: &[Target], sink: &mut ErrorHandler) -> Vec<CompileOutput> {
        match self.check(file, sink) {
            Ok(checked) => targets
                .iter()
                .map(|target| self.lower(file, &checked, *target, sink))
                .collect(),
            Err(failure) => {
                let default = self.config.compiler.default_target;
                targets
                    .iter()
                    .map(|target| failure.output(file, Some(*target), default))
                    .collect()
            }
        }
    }

    /// Loads `path` and compiles it.
    pub fn compile_path(&self, path: &Path, sink: &mut ErrorHandler) -> DriverResult<CompileOutput> {
        let file = SourceFile::load(path)?;
        Ok(self.compile(&file, sink))
    }

    /// Where the output of `file` for `target` is written: `<stem>.<ext>`
    /// under `out_dir`, or under the configured output directory.
    pub fn output_path(&self, file: &SourceFile, target: Target, out_dir: Option<&Path>) -> PathBuf {
        let dir = out_dir.unwrap_or(&self.config.output.out_dir);
        let stem = file.stem().unwrap_or("component");
        dir.join(format!("{}.{}", stem, target.extension()))
    }

    /// Writes the generated code of `output` to `path`, creating missing
    /// directories.
    pub fn write_output(&self, output: &CompileOutput, path: &Path) -> DriverResult<()> {
        let code = output.code.as_deref().ok_or_else(|| DriverError::NothingToWrite {
            file: output.file.clone(),
        })?;
        let write_error = |source| DriverError::WriteError {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, code).map_err(write_error)?;
        log::debug!("Wrote {} to {}", output.target, path.display());
        Ok(())
    }

    fn check(&self, file: &SourceFile, sink: &mut ErrorHandler) -> Result<Checked, ParseFailure> {
        let ast = match parse_file(file) {
            Ok(ast) => ast,
            Err(error) => {
                let failure = self.parse_failure(file, &error);
                sink.handle_compilation_error(failure.error.clone());
                return Err(failure);
            }
        };

        let Some(program) = ast.as_program() else {
            return Ok(Checked {
                ast,
                diagnostics: Vec::new(),
                blocking: Vec::new(),
            });
        };

        let diagnostics = TypeErrorHandler::with_source(file.contents()).check_program(program);
        let mut blocking = Vec::new();
        if self.config.compiler.strict_types {
            for diagnostic in diagnostics.iter().filter(|diagnostic| diagnostic.is_error()) {
                let error = CompilationError::new(CompilationErrorKind::Syntax, diagnostic.message.clone(), file.display_name())
                    .at(diagnostic.location.line, diagnostic.location.column)
                    .with_suggestions(diagnostic.suggestions.clone());
                sink.handle_compilation_error(error.clone());
                blocking.push(error);
            }
        }
        log::debug!(
            "Checked {}: {} type diagnostics, {} blocking",
            file.display_name(),
            diagnostics.len(),
            blocking.len()
        );
        Ok(Checked {
            ast,
            diagnostics,
            blocking,
        })
    }

    fn parse_failure(&self, file: &SourceFile, error: &SyntaxError) -> ParseFailure {
        let index = LineIndex::new(file.contents());
        let (declared_target, syntax_version) = match split_frontmatter(file.contents(), &index) {
            Ok(header) => (
                header.frontmatter.target,
                detect_syntax_version(&header.frontmatter, &file.contents()[header.body_start..]),
            ),
            Err(_) => (None, SyntaxVersion::Modern),
        };
        let path = file.display_name();

        // The modern-syntax categories only describe the component body.
        let (categorized, mut compilation) = if error.is_frontmatter() {
            let kind = if error.is_unknown_target() {
                CompilationErrorKind::Framework
            } else {
                CompilationErrorKind::Frontmatter
            };
            let location = error.location();
            let display = &self.config.diagnostics;
            let compilation = CompilationError::new(kind, error.to_string(), path)
                .at(location.line, location.column)
                .with_suggestions(kind.suggestions())
                .with_context(render_context(&index, location.line, display.lines_before, display.lines_after));
            (None, compilation)
        } else {
            let context = ErrorContext {
                source: file.contents(),
                file_path: &path,
                syntax_version,
            };
            let categorized = self.categorizer.categorize_error(error, &context);
            let compilation = CompilationError::from_categorized(&categorized, CompilationErrorKind::Syntax);
            (Some(categorized), compilation)
        };
        compilation.original_error = Some(error.to_string());
        ParseFailure {
            declared_target,
            syntax_version,
            categorized,
            error: compilation,
        }
    }

    fn lower(&self, file: &SourceFile, checked: &Checked, target: Target, sink: &mut ErrorHandler) -> CompileOutput {
        let mut output = CompileOutput::failed(file, target, checked.ast.syntax_version());
        output.diagnostics = checked.diagnostics.clone();
        if !checked.blocking.is_empty() {
            output.errors = checked.blocking.clone();
            return output;
        }

        let options = TransformOptions {
            file_stem: file.stem().map(str::to_string),
            runtime_module: self.config.compiler.runtime_module.clone(),
        };
        let transformer = transformer_for(target, options);
        let transformed = catch_unwind(AssertUnwindSafe(|| transformer.transform(&checked.ast)));

        match transformed {
            Ok(Transformed::Passthrough(UnifiedAst::LegacyProgram(legacy))) => {
                output.code = Some(legacy.content.clone());
            }
            Ok(transformed) => {
                if let Some(metadata) = transformed.into_metadata() {
                    output.code = Some(metadata.generated_code.component.clone());
                    output.generated = Some(metadata.generated_code);
                }
            }
            Err(payload) => {
                let error = CompilationError::new(
                    CompilationErrorKind::Runtime,
                    format!("The {} transformer failed: {}", target, panic_message(payload.as_ref())),
                    file.display_name(),
                );
                sink.handle_compilation_error(error.clone());
                output.errors.push(error);
            }
        }
        log::debug!(
            "Compiled {} for {}{}",
            file.display_name(),
            target,
            if output.is_success() { "" } else { " with errors" }
        );
        output
    }
}

impl ParseFailure {
    fn output(&self, file: &SourceFile, target: Option<Target>, default: Target) -> CompileOutput {
        let target = target.or(self.declared_target).unwrap_or(default);
        let mut output = CompileOutput::failed(file, target, self.syntax_version);
        output.categorized.extend(self.categorized.clone());
        output.errors.push(self.error.clone());
        output
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

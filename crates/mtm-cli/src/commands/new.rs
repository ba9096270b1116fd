use crate::error::{io_error, CliError};
use mtm_codegen::pascal_case;
use mtm_source::{CompilerConfig, Target, CONFIG_FILE_NAME};
use std::fs;
use std::path::{Path, PathBuf};

/// Creates `path` with an `mtm.toml` and a starter component in `src/`.
///
/// An existing directory is reused; an existing configuration is kept.
pub fn handle_new(path: &Path, target: Target) -> Result<PathBuf, CliError> {
    let raw_name = path
        .file_name()
        .map_or_else(|| "component".to_string(), |name| name.to_string_lossy().into_owned());
    let name = pascal_case(&raw_name);
    let name = if name.is_empty() { "Component".to_string() } else { name };
    println!("Creating {} component `{}` in {}", target, name, path.display());

    let src = path.join("src");
    fs::create_dir_all(&src).map_err(|e| io_error(e, src.clone(), "creating"))?;

    let config_path = path.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        let mut config = CompilerConfig::default();
        config.compiler.default_target = target;
        let content = config.to_toml()?;
        fs::write(&config_path, content).map_err(|e| io_error(e, config_path.clone(), "writing"))?;
    }

    let component = src.join(format!("{}.mtm", name));
    if component.exists() {
        return Err(CliError::AlreadyExists(component));
    }
    fs::write(&component, starter(&name, target)).map_err(|e| io_error(e, component.clone(), "writing"))?;

    println!("Created {}", component.display());
    Ok(component)
}

fn starter(name: &str, target: Target) -> String {
    format!(
        r#"---
target: {target}
name: {name}
---
$count! = 0

$increment = () => {{
  $count += 1
}}

<template>
  <button click="$increment()">Clicked {{{{$count}}}} times</button>
</template>
"#,
        target = target.name(),
        name = name
    )
}

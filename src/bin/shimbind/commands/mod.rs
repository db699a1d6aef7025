//! Command implementations

pub mod check;
pub mod completions;
pub mod explain;
pub mod generate;
pub mod graph;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::ModelArgs;
use shimbind::ops::{resolve_model, ModelResolution, ResolveOptions};
use shimbind::util::config::{global_config_path, load_config, project_config_path};
use shimbind::util::diagnostic::emit;
use shimbind::util::Config;

/// A resolved model with the configuration that applies to it.
pub struct Loaded {
    pub model: ModelResolution,
    pub config: Config,
}

/// Directory whose `.shimbind/config.toml` applies to a model path.
fn project_root(model: &Path, cwd: &Path) -> PathBuf {
    if model.is_dir() {
        return model.to_path_buf();
    }
    match model.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => cwd.to_path_buf(),
    }
}

/// Load configuration, resolve the model and print its diagnostics.
pub fn load(args: &ModelArgs, color: bool) -> Result<Loaded> {
    let cwd = std::env::current_dir().context("failed to determine the current directory")?;
    let model_path = args.model.clone().unwrap_or_else(|| cwd.clone());

    let root = project_root(&model_path, &cwd);
    let config = load_config(global_config_path().as_deref(), &project_config_path(&root));

    let model = resolve_model(&ResolveOptions {
        model: model_path,
        strict_unregistered: args.strict || config.strict_unregistered(),
    })?;

    for diagnostic in model.resolution.diagnostics.to_diagnostics() {
        emit(&diagnostic, color);
    }

    Ok(Loaded { model, config })
}

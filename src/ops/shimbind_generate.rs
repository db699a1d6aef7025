//! Implementation of `shimbind generate`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::emit::{EmitOptions, Emitter, RendererKind};
use crate::ops::resolve::ModelResolution;
use crate::util::cancel::CancellationToken;

/// Options for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Renderer to emit with
    pub renderer: RendererKind,

    /// Namespace and file layout
    pub emit: EmitOptions,

    /// Directory generated files are written to
    pub output_dir: PathBuf,

    /// Render without writing anything
    pub dry_run: bool,
}

/// What a generate run produced.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Unit paths, relative to the output directory.
    pub units: Vec<PathBuf>,
    /// Files written; empty on a dry run.
    pub written: Vec<PathBuf>,
    pub adapters: usize,
    pub fingerprint: String,
}

/// Render a resolved model and write the output.
///
/// Every unit is rendered before the first file is written, so a failed
/// or cancelled run leaves the output directory untouched.
pub fn generate(
    model: &ModelResolution,
    opts: &GenerateOptions,
    cancel: &CancellationToken,
) -> Result<GenerateResult> {
    let index = model.index();
    let emitter = Emitter::new(opts.renderer.renderer(), opts.emit.clone());
    let output = emitter.emit(&model.resolution, &index, cancel)?;

    let written = if opts.dry_run {
        tracing::info!("dry run, nothing written");
        Vec::new()
    } else {
        output.write_to(&opts.output_dir).with_context(|| {
            format!(
                "failed to write generated files to {}",
                opts.output_dir.display()
            )
        })?
    };

    Ok(GenerateResult {
        units: output.units.iter().map(|u| u.path.clone()).collect(),
        written,
        adapters: model.resolution.emittable().count(),
        fingerprint: output.fingerprint,
    })
}

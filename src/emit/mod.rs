//! Adapter emission.
//!
//! The emitter turns a [`Resolution`] into generated files. It never feeds
//! back into resolution: renderers only read the binding model.
//!
//! Output is deterministic. Adapters follow definition declaration order,
//! then target discovery order; members follow declaration order. Every
//! file is rendered in memory first, and nothing is written unless every
//! renderer call succeeded.

pub mod csharp;
pub mod plan;
pub mod tables;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::index::TypeIndex;
use crate::resolver::{Resolution, ResolvedPair};
use crate::util::cancel::CancellationToken;
use crate::util::fs::write_string;
use crate::util::hash::Fingerprint;

pub use csharp::CSharpRenderer;
pub use plan::PlanRenderer;
pub use tables::{LookupTables, TableEntry};

/// Error during emission.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum EmitError {
    #[error("emission cancelled")]
    #[diagnostic(code(shimbind::emit::cancelled))]
    Cancelled,

    #[error("refusing to emit: resolution reported {errors} error(s)")]
    #[diagnostic(
        code(shimbind::emit::unresolved),
        help("Run `shimbind check` to see the errors")
    )]
    Unresolved { errors: usize },

    #[error("failed to render `{unit}`")]
    #[diagnostic(code(shimbind::emit::render))]
    Render {
        unit: String,
        #[source]
        source: fmt::Error,
    },

    #[error("failed to serialize the binding plan")]
    #[diagnostic(code(shimbind::emit::serialize))]
    Serialize(#[from] serde_json::Error),
}

/// Available renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    /// C# adapter classes plus lookup tables (default)
    #[default]
    CSharp,
    /// JSON binding plan
    Plan,
}

impl RendererKind {
    /// Instantiate the renderer.
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            RendererKind::CSharp => Box::new(CSharpRenderer::new()),
            RendererKind::Plan => Box::new(PlanRenderer::new()),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::CSharp => write!(f, "csharp"),
            RendererKind::Plan => write!(f, "plan"),
        }
    }
}

impl std::str::FromStr for RendererKind {
    type Err = RendererKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Ok(RendererKind::CSharp),
            "plan" | "json" => Ok(RendererKind::Plan),
            _ => Err(RendererKindParseError(s.to_string())),
        }
    }
}

/// Error parsing a renderer name.
#[derive(Debug, Clone, Error)]
#[error("invalid renderer '{0}', valid values: csharp, plan")]
pub struct RendererKindParseError(pub String);

/// Settings shared by every renderer.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub namespace: String,
    /// One unit per adapter instead of a single combined unit.
    pub file_per_adapter: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            namespace: crate::util::config::DEFAULT_NAMESPACE.to_string(),
            file_per_adapter: false,
        }
    }
}

/// Everything a renderer needs, in emission order.
#[derive(Debug)]
pub struct EmitModel<'r> {
    pub adapters: Vec<&'r ResolvedPair>,
    pub tables: LookupTables,
}

impl<'r> EmitModel<'r> {
    /// Select the emittable pairs of a resolution and build their tables.
    pub fn build(resolution: &'r Resolution, index: &TypeIndex<'_>) -> Self {
        let adapters: Vec<&ResolvedPair> = resolution.emittable().collect();
        let tables = LookupTables::build(&adapters, index);
        EmitModel { adapters, tables }
    }
}

/// A renderer turns the binding model into generated units.
pub trait Renderer {
    fn kind(&self) -> RendererKind;

    fn render(&self, model: &EmitModel<'_>, options: &EmitOptions) -> Result<Vec<GeneratedUnit>, EmitError>;
}

/// One generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedUnit {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        GeneratedUnit {
            path: path.into(),
            contents,
        }
    }
}

/// Fully rendered output.
#[derive(Debug, Clone)]
pub struct EmitOutput {
    pub units: Vec<GeneratedUnit>,
    /// SHA-256 over every unit's path and contents.
    pub fingerprint: String,
}

impl EmitOutput {
    fn new(units: Vec<GeneratedUnit>) -> Self {
        let mut fp = Fingerprint::new();
        for unit in &units {
            fp.update_strs([&*unit.path.to_string_lossy(), unit.contents.as_str()]);
        }
        EmitOutput {
            units,
            fingerprint: fp.finish(),
        }
    }

    /// Write every unit below `dir`, returning the written paths.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            let path = dir.join(&unit.path);
            write_string(&path, &unit.contents)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Drives a renderer over a resolution.
pub struct Emitter {
    renderer: Box<dyn Renderer>,
    options: EmitOptions,
}

impl Emitter {
    pub fn new(renderer: Box<dyn Renderer>, options: EmitOptions) -> Self {
        Emitter { renderer, options }
    }

    /// Render a resolution.
    ///
    /// Refuses any resolution with errors, and checks `cancel` before
    /// rendering starts.
    pub fn emit(
        &self,
        resolution: &Resolution,
        index: &TypeIndex<'_>,
        cancel: &CancellationToken,
    ) -> Result<EmitOutput, EmitError> {
        if resolution.diagnostics.has_errors() {
            return Err(EmitError::Unresolved {
                errors: resolution.diagnostics.error_count(),
            });
        }
        if cancel.is_cancelled() {
            return Err(EmitError::Cancelled);
        }

        let model = EmitModel::build(resolution, index);
        tracing::debug!(
            "rendering {} adapter(s) with the {} renderer",
            model.adapters.len(),
            self.renderer.kind()
        );
        let units = self.renderer.render(&model, &self.options)?;

        if cancel.is_cancelled() {
            return Err(EmitError::Cancelled);
        }

        let output = EmitOutput::new(units);
        tracing::info!(
            "rendered {} unit(s), fingerprint {}",
            output.units.len(),
            &output.fingerprint[..16]
        );
        Ok(output)
    }
}

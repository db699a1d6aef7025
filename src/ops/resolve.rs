//! Loading and resolving program models.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::index::TypeIndex;
use crate::core::program::Program;
use crate::resolver::{Resolution, Session, ShimGraph};
use crate::util::diagnostic::suggestions;

/// Options for resolving a model.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Model file, or a directory of model files
    pub model: PathBuf,

    /// Report interfaces used without a shim marker as errors
    pub strict_unregistered: bool,
}

/// A loaded program together with the session that resolved it.
#[derive(Debug)]
pub struct ModelResolution {
    pub program: Program,
    pub session: Session,
    pub resolution: Resolution,
}

impl ModelResolution {
    pub fn index(&self) -> TypeIndex<'_> {
        TypeIndex::new(&self.program)
    }

    pub fn graph(&self) -> &ShimGraph {
        self.session.graph()
    }
}

/// Load a model file or directory.
pub fn load_model(path: &Path) -> Result<Program> {
    if !path.exists() {
        bail!("model not found: {}\n{}", path.display(), suggestions::NO_MODEL);
    }
    Program::load(path).with_context(|| format!("failed to load model from {}", path.display()))
}

/// Load a model and run one resolution pass over it.
pub fn resolve_model(opts: &ResolveOptions) -> Result<ModelResolution> {
    let program = load_model(&opts.model)?;
    tracing::debug!(
        "loaded {} type(s) and {} call site(s) from {}",
        program.types.len(),
        program.call_sites.len(),
        opts.model.display()
    );

    let mut session = Session::new().with_strict_unregistered(opts.strict_unregistered);
    let resolution = session.resolve(&program);

    Ok(ModelResolution {
        program,
        session,
        resolution,
    })
}

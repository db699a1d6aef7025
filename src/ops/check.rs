//! Implementation of `shimbind check`.

use std::fmt;

use crate::ops::resolve::ModelResolution;

/// Counts reported after a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub definitions: usize,
    pub pairs: usize,
    pub bindings: usize,
    /// Members left without a binding.
    pub unbound: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckSummary {
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shim(s), {} adapter pair(s), {} binding(s)",
            self.definitions, self.pairs, self.bindings
        )?;
        if self.unbound > 0 {
            write!(f, ", {} unbound member(s)", self.unbound)?;
        }
        write!(f, "; {} error(s), {} warning(s)", self.errors, self.warnings)
    }
}

/// Summarize a resolved model.
pub fn check(model: &ModelResolution) -> CheckSummary {
    let resolution = &model.resolution;
    let bindings = resolution.binding_count();
    let members: usize = resolution.pairs.iter().map(|p| p.members.len()).sum();

    CheckSummary {
        definitions: model.session.definitions().count(),
        pairs: resolution.pairs.len(),
        bindings,
        unbound: members - bindings,
        errors: resolution.diagnostics.error_count(),
        warnings: resolution.diagnostics.warning_count(),
    }
}

//! Resolution error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{Diagnostic, Severity};

/// Problem found while resolving shims.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("`{name}` is used as a shim but is a {kind}, not an interface")]
    #[diagnostic(
        code(shimbind::resolve::not_an_interface),
        help("Shims can only adapt onto interfaces")
    )]
    NotAnInterface {
        name: String,
        kind: String,
        location: Option<String>,
    },

    #[error("unknown type `{name}`")]
    #[diagnostic(code(shimbind::resolve::unknown_type))]
    UnknownType { name: String, referenced_by: String },

    #[error("interface `{interface}` is used as a shim without a shim marker")]
    #[diagnostic(
        code(shimbind::resolve::unregistered_shim),
        severity(Warning),
        help("Add a shim marker to `{interface}`")
    )]
    UnregisteredShim {
        interface: String,
        location: Option<String>,
    },

    #[error("{kind} shim `{interface}` has no target type")]
    #[diagnostic(code(shimbind::resolve::missing_target))]
    MissingTarget { interface: String, kind: String },

    #[error("`{interface}.{member}` has no matching member on `{target}`")]
    #[diagnostic(code(shimbind::resolve::unresolved_member))]
    UnresolvedMember {
        interface: String,
        member: String,
        target: String,
    },

    #[error("`{interface}.{member}` is ambiguous on `{target}`")]
    #[diagnostic(code(shimbind::resolve::ambiguous_overload))]
    AmbiguousOverload {
        interface: String,
        member: String,
        target: String,
        candidates: Vec<String>,
    },
}

impl ResolveError {
    /// Severity before any strictness promotion.
    pub fn severity(&self) -> Severity {
        match self {
            ResolveError::UnregisteredShim { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NotAnInterface {
                name,
                kind,
                location,
            } => {
                let mut diag = Diagnostic::error(self.to_string())
                    .with_context(format!("`{}` is declared as a {}", name, kind));
                if let Some(location) = location {
                    diag = diag.with_location(location);
                }
                diag.with_suggestion(format!("Declare an interface over `{}` and adapt to that", name))
            }

            ResolveError::UnknownType {
                name,
                referenced_by,
            } => Diagnostic::error(self.to_string())
                .with_context(format!("referenced by {}", referenced_by))
                .with_suggestion(format!("Add a declaration for `{}` to the model", name))
                .with_suggestion("Check that the type name is spelled correctly"),

            ResolveError::UnregisteredShim {
                interface,
                location,
            } => {
                let mut diag = Diagnostic::warning(self.to_string())
                    .with_context("the interface is registered as an instance shim");
                if let Some(location) = location {
                    diag = diag.with_location(location);
                }
                diag.with_suggestion(format!(
                    "Add `shim = {{ kind = \"instance\" }}` to `{}`",
                    interface
                ))
            }

            ResolveError::MissingTarget { interface, .. } => Diagnostic::error(self.to_string())
                .with_suggestion(format!(
                    "Set `target` in the shim marker of `{}`",
                    interface
                ))
                .with_suggestion("Or adapt a value of the target type at a call site"),

            ResolveError::UnresolvedMember {
                interface, target, ..
            } => Diagnostic::error(self.to_string())
                .with_suggestion(format!(
                    "Add a `target_name` override if `{}` names the member differently",
                    target
                ))
                .with_suggestion(format!(
                    "Set `ignore_missing_members = true` on `{}` to generate a throwing member",
                    interface
                )),

            ResolveError::AmbiguousOverload { candidates, .. } => {
                let mut diag = Diagnostic::error(self.to_string());
                for candidate in candidates {
                    diag = diag.with_context(format!("candidate: {}", candidate));
                }
                diag.with_suggestion("Declare parameter types that match one overload exactly")
                    .with_suggestion("Pin an argument with `unwrap_to`")
            }
        }
    }
}

/// All diagnostics produced by one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<ResolveError>,
    strict: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Treat warnings as errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Record a diagnostic. Repeats are dropped.
    pub fn push(&mut self, error: ResolveError) {
        if !self.entries.contains(&error) {
            self.entries.push(error);
        }
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ResolveError>) {
        for error in errors {
            self.push(error);
        }
    }

    /// Effective severity of one entry.
    pub fn severity_of(&self, error: &ResolveError) -> Severity {
        match error.severity() {
            Severity::Warning if self.strict => Severity::Error,
            severity => severity,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ResolveError> {
        self.entries
            .iter()
            .filter(|e| self.severity_of(e) == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ResolveError> {
        self.entries
            .iter()
            .filter(|e| self.severity_of(e) == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolveError> {
        self.entries.iter()
    }

    /// Render every entry, in the order found, with its effective severity.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .iter()
            .map(|e| {
                let mut diag = e.to_diagnostic();
                diag.severity = self.severity_of(e);
                diag
            })
            .collect()
    }
}

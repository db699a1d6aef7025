//! Shim targets.
//!
//! A target is one concrete type an interface is adapted onto. Its identity
//! is (interface, type, mode); the mode is fixed when the target is created.

use std::fmt;

use serde::Serialize;

use crate::core::types::TypeRef;

/// How a target's members are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingMode {
    /// Members are invoked on a wrapped instance.
    Instance,
    /// Members are invoked on the type itself.
    Static,
    /// Members construct new instances of the type.
    Constructor,
}

impl fmt::Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingMode::Instance => write!(f, "instance"),
            BindingMode::Static => write!(f, "static"),
            BindingMode::Constructor => write!(f, "constructor"),
        }
    }
}

/// One concrete type an interface is adapted onto.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShimTarget {
    /// The adapted interface (identity of the originating definition).
    pub interface: TypeRef,
    /// The concrete type.
    pub ty: TypeRef,
    pub mode: BindingMode,
}

impl ShimTarget {
    pub fn new(interface: TypeRef, ty: TypeRef, mode: BindingMode) -> Self {
        ShimTarget {
            interface,
            ty,
            mode,
        }
    }

    /// Deterministic, identifier-safe name of the adapter for this pair.
    pub fn adapter_name(&self) -> String {
        let suffix = match self.mode {
            BindingMode::Instance => "",
            BindingMode::Static => "_Static",
            BindingMode::Constructor => "_Factory",
        };
        format!("{}__{}{}", self.interface.ident(), self.ty.ident(), suffix)
    }

    /// Whether adapters for this target wrap an instance.
    pub fn holds_instance(&self) -> bool {
        self.mode == BindingMode::Instance
    }
}

impl fmt::Display for ShimTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.interface, self.ty, self.mode)
    }
}

/// The receiver expression a bound member is invoked on.
///
/// Derived per binding, never stored on the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum Callee {
    /// The wrapped instance, as declared.
    Instance,
    /// The wrapped instance narrowed to an interface it implements.
    Narrowed(TypeRef),
    /// A static member of the type.
    Static(TypeRef),
    /// A constructor of the type.
    Constructor(TypeRef),
    /// A static forwarder on the type receiving the instance first.
    Forwarder(TypeRef),
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Instance => write!(f, "the wrapped instance"),
            Callee::Narrowed(iface) => write!(f, "the wrapped instance as {}", iface),
            Callee::Static(ty) => write!(f, "static members of {}", ty),
            Callee::Constructor(ty) => write!(f, "a new {}", ty),
            Callee::Forwarder(ty) => write!(f, "forwarder {}", ty),
        }
    }
}

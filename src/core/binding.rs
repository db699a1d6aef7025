//! Bindings: the resolved correspondence between a shim member and what
//! implements it on a target.

use serde::Serialize;

use crate::core::member::TargetMember;
use crate::core::target::Callee;
use crate::core::types::{SequenceShape, TypeRef};

/// An argument that must be unwrapped to its underlying instance before
/// it is passed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgAdaptation {
    /// Shim parameter position (0 is the value of a property setter).
    pub position: usize,
    /// The shim interface the argument is declared as.
    pub interface: TypeRef,
    /// The type the target member expects.
    pub underlying: TypeRef,
    /// The argument is a sequence whose elements are unwrapped one by one.
    pub each: bool,
    /// How the target holds the unwrapped sequence.
    pub collect: SequenceShape,
}

/// How a target return value is turned into the shim's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReturnAdaptation {
    /// Wrap the value in an adapter for `interface`.
    Wrap {
        interface: TypeRef,
        underlying: TypeRef,
    },
    /// Wrap every element of a returned sequence.
    WrapEach {
        interface: TypeRef,
        underlying: TypeRef,
        collect: SequenceShape,
    },
}

impl ReturnAdaptation {
    pub fn interface(&self) -> &TypeRef {
        match self {
            ReturnAdaptation::Wrap { interface, .. } | ReturnAdaptation::WrapEach { interface, .. } => {
                interface
            }
        }
    }

    pub fn underlying(&self) -> &TypeRef {
        match self {
            ReturnAdaptation::Wrap { underlying, .. }
            | ReturnAdaptation::WrapEach { underlying, .. } => underlying,
        }
    }
}

/// The resolved part of a non-empty binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub member: TargetMember,
    pub callee: Callee,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgAdaptation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ret: Option<ReturnAdaptation>,
    /// Trailing target parameters left to their defaults.
    pub omitted_defaults: usize,
}

impl Resolved {
    pub fn new(member: TargetMember, callee: Callee) -> Self {
        Resolved {
            member,
            callee,
            args: Vec::new(),
            ret: None,
            omitted_defaults: 0,
        }
    }

    pub fn arg_at(&self, position: usize) -> Option<&ArgAdaptation> {
        self.args.iter().find(|a| a.position == position)
    }

    pub fn adaptation_count(&self) -> usize {
        self.args.len() + usize::from(self.ret.is_some())
    }
}

/// Resolved outcome for one shim member against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "binding", content = "resolved", rename_all = "snake_case")]
pub enum Binding {
    /// Nothing on the target satisfies the member.
    Empty,
    /// The member delegates straight to a target member.
    Direct(Resolved),
    /// The member is reached through an intermediary.
    Proxy(Resolved),
    /// The member constructs a new target instance.
    Constructor(Resolved),
}

impl Binding {
    pub fn is_empty(&self) -> bool {
        matches!(self, Binding::Empty)
    }

    pub fn resolved(&self) -> Option<&Resolved> {
        match self {
            Binding::Empty => None,
            Binding::Direct(r) | Binding::Proxy(r) | Binding::Constructor(r) => Some(r),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Binding::Empty => "empty",
            Binding::Direct(_) => "direct",
            Binding::Proxy(_) => "proxy",
            Binding::Constructor(_) => "constructor",
        }
    }

    /// (interface, underlying type) pairs this binding needs adapters for.
    pub fn nested_pairs(&self) -> Vec<(TypeRef, TypeRef)> {
        let Some(resolved) = self.resolved() else {
            return Vec::new();
        };
        let mut pairs: Vec<(TypeRef, TypeRef)> = Vec::new();
        let args = resolved
            .args
            .iter()
            .map(|a| (a.interface.clone(), a.underlying.clone()));
        let ret = resolved
            .ret
            .iter()
            .map(|r| (r.interface().clone(), r.underlying().clone()));
        for pair in args.chain(ret) {
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }
}

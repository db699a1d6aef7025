//! Shim definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::member::ShimMember;
use crate::core::program::{ShimMarker, TypeDecl};
use crate::core::target::BindingMode;
use crate::core::types::TypeRef;

/// How a shim interface is adapted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShimKind {
    /// Adapts a per-call-site instance.
    #[default]
    Instance,
    /// Adapts a type's static members.
    Static,
    /// Every member constructs a new target instance.
    #[serde(alias = "constructor")]
    ConstructorFactory,
}

impl ShimKind {
    /// The binding mode targets of this kind are created with.
    pub fn binding_mode(self) -> BindingMode {
        match self {
            ShimKind::Instance => BindingMode::Instance,
            ShimKind::Static => BindingMode::Static,
            ShimKind::ConstructorFactory => BindingMode::Constructor,
        }
    }
}

impl fmt::Display for ShimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShimKind::Instance => write!(f, "instance"),
            ShimKind::Static => write!(f, "static"),
            ShimKind::ConstructorFactory => write!(f, "constructor-factory"),
        }
    }
}

/// Options set on a definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShimOptions {
    pub ignore_missing_members: bool,
}

/// One declared adapter interface. Identity is the interface type.
#[derive(Debug, Clone, Serialize)]
pub struct ShimDefinition {
    pub interface: TypeRef,
    pub kind: ShimKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_target: Option<TypeRef>,
    pub options: ShimOptions,
    pub members: Vec<ShimMember>,
    /// Whether the interface carries an explicit shim marker.
    pub registered: bool,
}

impl ShimDefinition {
    /// Definition from an interface carrying a shim marker.
    pub fn declared(decl: &TypeDecl, marker: &ShimMarker) -> Self {
        ShimDefinition {
            interface: decl.name.clone(),
            kind: marker.kind,
            declared_target: marker.target.clone(),
            options: ShimOptions {
                ignore_missing_members: marker.ignore_missing_members,
            },
            members: Self::collect_members(decl),
            registered: true,
        }
    }

    /// Definition inferred for an interface used without a marker.
    pub fn implicit(decl: &TypeDecl) -> Self {
        ShimDefinition {
            interface: decl.name.clone(),
            kind: ShimKind::Instance,
            declared_target: None,
            options: ShimOptions::default(),
            members: Self::collect_members(decl),
            registered: false,
        }
    }

    fn collect_members(decl: &TypeDecl) -> Vec<ShimMember> {
        decl.members
            .iter()
            .enumerate()
            .filter_map(|(i, m)| ShimMember::from_decl(i, m))
            .collect()
    }

    /// Whether `member` binds to a constructor under this definition.
    pub fn is_constructor_member(&self, member: &ShimMember) -> bool {
        member.constructor
            || (self.kind == ShimKind::ConstructorFactory && member.member_kind().is_callable())
    }
}

impl PartialEq for ShimDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.interface == other.interface
    }
}

impl Eq for ShimDefinition {}

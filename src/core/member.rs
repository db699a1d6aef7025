//! Shim members and target members.
//!
//! A `ShimMember` is what an interface asks for; a `TargetMember` is what a
//! concrete type offers. Both are derived from `MemberDecl`s of the program
//! model and carry only what matching and emission need.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::program::{MemberDecl, MemberKind};
use crate::core::types::TypeRef;

/// A parameter of a shim method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimParam {
    pub name: String,
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unwrap_to: Option<TypeRef>,
}

/// What kind of member the interface declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShimMemberKind {
    Method {
        params: Vec<ShimParam>,
        returns: TypeRef,
    },
    Property {
        ty: TypeRef,
        get: bool,
        set: bool,
        init: bool,
    },
    Event {
        handler: TypeRef,
    },
}

/// One member declared on a shim interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimMember {
    /// Declaration order within the interface.
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub kind: ShimMemberKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<TypeRef>,
    pub constructor: bool,
}

impl ShimMember {
    /// Derive a shim member from an interface member declaration.
    ///
    /// Returns `None` for declarations an interface cannot meaningfully
    /// contribute (fields and constructors).
    pub fn from_decl(index: usize, decl: &MemberDecl) -> Option<Self> {
        let kind = match decl.kind {
            MemberKind::Method => ShimMemberKind::Method {
                params: decl
                    .params
                    .iter()
                    .map(|p| ShimParam {
                        name: p.name.clone(),
                        ty: p.ty.clone(),
                        unwrap_to: p.unwrap_to.clone(),
                    })
                    .collect(),
                returns: decl.return_type(),
            },
            MemberKind::Property => ShimMemberKind::Property {
                ty: decl.ty.clone()?,
                get: decl.get,
                set: decl.set,
                init: decl.init,
            },
            MemberKind::Event => ShimMemberKind::Event {
                handler: decl.ty.clone()?,
            },
            MemberKind::Field | MemberKind::Constructor => return None,
        };

        let overrides = decl.shim.clone().unwrap_or_default();
        Some(ShimMember {
            index,
            name: decl.name.clone(),
            kind,
            target_name: overrides.target_name,
            target_type: overrides.target_type,
            proxy: overrides.proxy,
            constructor: overrides.constructor,
        })
    }

    /// Name of the target member to bind: the override wins.
    pub fn effective_name(&self) -> &str {
        self.target_name.as_deref().unwrap_or(&self.name)
    }

    pub fn member_kind(&self) -> MemberKind {
        match self.kind {
            ShimMemberKind::Method { .. } => MemberKind::Method,
            ShimMemberKind::Property { .. } => MemberKind::Property,
            ShimMemberKind::Event { .. } => MemberKind::Event,
        }
    }

    /// Human-readable signature for diagnostics.
    pub fn signature(&self) -> String {
        match &self.kind {
            ShimMemberKind::Method { params, returns } => {
                let params: Vec<_> = params.iter().map(|p| p.ty.to_string()).collect();
                format!("{} {}({})", returns, self.name, params.join(", "))
            }
            ShimMemberKind::Property { ty, get, set, init } => {
                let mut accessors = Vec::new();
                if *get {
                    accessors.push("get;");
                }
                if *set {
                    accessors.push("set;");
                }
                if *init {
                    accessors.push("init;");
                }
                format!("{} {} {{ {} }}", ty, self.name, accessors.join(" "))
            }
            ShimMemberKind::Event { handler } => format!("event {} {}", handler, self.name),
        }
    }
}

/// A parameter of a target method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetParam {
    pub name: String,
    pub ty: TypeRef,
    pub has_default: bool,
}

/// What kind of member the target type offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetMemberKind {
    Method {
        params: Vec<TargetParam>,
        returns: TypeRef,
    },
    Property {
        ty: TypeRef,
        get: bool,
        set: bool,
        init: bool,
    },
    Field {
        ty: TypeRef,
        readonly: bool,
    },
    Constructor {
        params: Vec<TargetParam>,
    },
    Event {
        handler: TypeRef,
    },
}

/// One member found on a target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetMember {
    pub name: String,
    #[serde(flatten)]
    pub kind: TargetMemberKind,
    pub is_static: bool,
    pub declaring_type: TypeRef,
    /// Interface through which an explicitly implemented member is reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<TypeRef>,
}

impl TargetMember {
    /// Derive a target member from a declaration on `owner`.
    pub fn from_decl(
        decl: &MemberDecl,
        owner: &TypeRef,
        subst: &HashMap<String, TypeRef>,
    ) -> Self {
        let params = || {
            decl.params
                .iter()
                .map(|p| TargetParam {
                    name: p.name.clone(),
                    ty: p.ty.substitute(subst),
                    has_default: p.default.is_some(),
                })
                .collect()
        };
        let value_ty = || {
            decl.ty
                .as_ref()
                .map(|t| t.substitute(subst))
                .unwrap_or_else(TypeRef::void)
        };

        let kind = match decl.kind {
            MemberKind::Method => TargetMemberKind::Method {
                params: params(),
                returns: decl.return_type().substitute(subst),
            },
            MemberKind::Property => TargetMemberKind::Property {
                ty: value_ty(),
                get: decl.get,
                set: decl.set,
                init: decl.init,
            },
            MemberKind::Field => TargetMemberKind::Field {
                ty: value_ty(),
                readonly: decl.readonly,
            },
            MemberKind::Constructor => TargetMemberKind::Constructor { params: params() },
            MemberKind::Event => TargetMemberKind::Event { handler: value_ty() },
        };

        TargetMember {
            name: decl.name.clone(),
            kind,
            is_static: decl.is_static,
            declaring_type: owner.clone(),
            via: decl.via.clone(),
        }
    }

    pub fn params(&self) -> &[TargetParam] {
        match &self.kind {
            TargetMemberKind::Method { params, .. } | TargetMemberKind::Constructor { params } => {
                params
            }
            _ => &[],
        }
    }

    /// Property, field or event type; method return type.
    pub fn value_type(&self) -> Option<&TypeRef> {
        match &self.kind {
            TargetMemberKind::Method { returns, .. } => Some(returns),
            TargetMemberKind::Property { ty, .. } | TargetMemberKind::Field { ty, .. } => Some(ty),
            TargetMemberKind::Event { handler } => Some(handler),
            TargetMemberKind::Constructor { .. } => None,
        }
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, TargetMemberKind::Constructor { .. })
    }

    fn category(&self) -> u8 {
        match self.kind {
            TargetMemberKind::Method { .. } => 0,
            TargetMemberKind::Property { .. } | TargetMemberKind::Field { .. } => 1,
            TargetMemberKind::Constructor { .. } => 2,
            TargetMemberKind::Event { .. } => 3,
        }
    }

    /// Whether this (more derived) member hides `other` from a base class.
    pub fn hides(&self, other: &TargetMember) -> bool {
        if self.name != other.name
            || self.category() != other.category()
            || self.is_static != other.is_static
            || self.via != other.via
            || other.is_constructor()
        {
            return false;
        }
        let mine = self.params().iter().map(|p| &p.ty);
        let theirs = other.params().iter().map(|p| &p.ty);
        mine.eq(theirs)
    }

    /// Human-readable signature for diagnostics.
    pub fn signature(&self) -> String {
        let owner = &self.declaring_type;
        let params = || {
            self.params()
                .iter()
                .map(|p| {
                    if p.has_default {
                        format!("{} = default", p.ty)
                    } else {
                        p.ty.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        let prefix = if self.is_static { "static " } else { "" };
        match &self.kind {
            TargetMemberKind::Method { returns, .. } => {
                format!("{}{} {}.{}({})", prefix, returns, owner, self.name, params())
            }
            TargetMemberKind::Constructor { .. } => format!("new {}({})", owner, params()),
            TargetMemberKind::Property { ty, .. } | TargetMemberKind::Field { ty, .. } => {
                format!("{}{} {}.{}", prefix, ty, owner, self.name)
            }
            TargetMemberKind::Event { handler } => {
                format!("{}event {} {}.{}", prefix, handler, owner, self.name)
            }
        }
    }
}

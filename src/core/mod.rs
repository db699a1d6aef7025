//! Core data structures for shimbind.
//!
//! This module contains the foundational types used throughout the crate:
//! - Type references and the program model (declarations, markers, call sites)
//! - Name resolution over the model (`TypeIndex`)
//! - Shim definitions, targets, members and bindings

pub mod binding;
pub mod definition;
pub mod index;
pub mod member;
pub mod program;
pub mod target;
pub mod types;

pub use binding::{ArgAdaptation, Binding, Resolved, ReturnAdaptation};
pub use definition::{ShimDefinition, ShimKind, ShimOptions};
pub use index::TypeIndex;
pub use member::{ShimMember, ShimMemberKind, ShimParam, TargetMember, TargetMemberKind, TargetParam};
pub use program::{
    CallSite, MemberDecl, MemberKind, MemberOverride, ParamDecl, Program, ShimMarker, TypeDecl,
    TypeKind,
};
pub use target::{BindingMode, Callee, ShimTarget};
pub use types::{TypeRef, TypeRefParseError};

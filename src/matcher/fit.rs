//! How well one type fits where another is expected.
//!
//! Arguments flow from the shim into the target; return values flow from
//! the target back out through the shim. Each direction classifies a pair
//! of types as an exact match, a plain assignment, or a required
//! adaptation through another shim interface.

use crate::core::index::TypeIndex;
use crate::core::types::{SequenceShape, TypeRef};

/// Adaptation needed to bridge a shim type and a target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapt {
    pub interface: TypeRef,
    pub underlying: TypeRef,
    /// Applies element-wise to a sequence.
    pub each: bool,
    /// How the receiving side holds an element-wise result.
    pub collect: SequenceShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fit {
    Exact,
    Assignable,
    Adapted(Adapt),
}

fn is_adaptable(index: &TypeIndex<'_>, ty: &TypeRef) -> bool {
    index.is_interface(ty)
}

/// Fit of a shim argument of type `shim` passed to a target parameter of
/// type `target`.
pub fn fit_argument(
    index: &TypeIndex<'_>,
    shim: &TypeRef,
    unwrap_to: Option<&TypeRef>,
    target: &TypeRef,
) -> Option<Fit> {
    if let Some(unwrap) = unwrap_to {
        let accepted = unwrap == target || index.is_assignable(unwrap, target);
        return (accepted && is_adaptable(index, shim)).then(|| {
            Fit::Adapted(Adapt {
                interface: shim.clone(),
                underlying: unwrap.clone(),
                each: false,
                collect: SequenceShape::Lazy,
            })
        });
    }

    if shim == target {
        return Some(Fit::Exact);
    }
    if index.is_assignable(shim, target) {
        return Some(Fit::Assignable);
    }
    if target.is_void() {
        return None;
    }

    if let (Some(shim_elem), Some((target_elem, collect))) = (shim.sequence_element(), target.sequence()) {
        if is_adaptable(index, shim_elem) && !target_elem.is_void() {
            return Some(Fit::Adapted(Adapt {
                interface: shim_elem.clone(),
                underlying: target_elem.clone(),
                each: true,
                collect,
            }));
        }
    }

    is_adaptable(index, shim).then(|| {
        Fit::Adapted(Adapt {
            interface: shim.clone(),
            underlying: target.clone(),
            each: false,
            collect: SequenceShape::Lazy,
        })
    })
}

/// Fit of a target value of type `target` returned as shim type `shim`.
pub fn fit_return(index: &TypeIndex<'_>, target: &TypeRef, shim: &TypeRef) -> Option<Fit> {
    if shim.is_void() {
        return Some(Fit::Exact);
    }
    if target.is_void() {
        return None;
    }
    if shim == target {
        return Some(Fit::Exact);
    }
    if index.is_assignable(target, shim) {
        return Some(Fit::Assignable);
    }

    if let (Some((shim_elem, collect)), Some(target_elem)) = (shim.sequence(), target.sequence_element()) {
        if is_adaptable(index, shim_elem) {
            return Some(Fit::Adapted(Adapt {
                interface: shim_elem.clone(),
                underlying: target_elem.clone(),
                each: true,
                collect,
            }));
        }
    }

    is_adaptable(index, shim).then(|| {
        Fit::Adapted(Adapt {
            interface: shim.clone(),
            underlying: target.clone(),
            each: false,
            collect: SequenceShape::Lazy,
        })
    })
}

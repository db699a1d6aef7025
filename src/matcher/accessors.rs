//! Property and event matching.

use crate::core::index::TypeIndex;
use crate::core::member::TargetMemberKind;
use crate::core::types::TypeRef;
use crate::matcher::fit::{fit_argument, fit_return, Fit};
use crate::matcher::overload::{arg_adaptation, return_adaptation, CallFit};

/// Accessors a shim property declares.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accessors {
    pub get: bool,
    pub set: bool,
    pub init: bool,
}

/// Check a shim property against a target property or field.
///
/// The target need not expose every accessor, only those the shim
/// declares: a getter needs a target getter, a setter needs a target
/// setter, and `init` accepts a target setter or init accessor.
pub(crate) fn fit_property(
    index: &TypeIndex<'_>,
    ty: &TypeRef,
    wanted: Accessors,
    candidate: &TargetMemberKind,
) -> Option<CallFit> {
    let (target_ty, offered) = match candidate {
        TargetMemberKind::Property { ty, get, set, init } => (
            ty,
            Accessors {
                get: *get,
                set: *set,
                init: *set || *init,
            },
        ),
        TargetMemberKind::Field { ty, readonly } => (
            ty,
            Accessors {
                get: true,
                set: !readonly,
                init: !readonly,
            },
        ),
        _ => return None,
    };

    let reads = wanted.get || !(wanted.set || wanted.init);
    if (reads && !offered.get) || (wanted.set && !offered.set) || (wanted.init && !offered.init) {
        return None;
    }

    let mut fit = CallFit::default();
    if reads {
        let ret = fit_return(index, target_ty, ty)?;
        fit.score.record(&ret);
        if let Fit::Adapted(adapt) = ret {
            fit.ret = Some(return_adaptation(adapt));
        }
    }
    if wanted.set || wanted.init {
        let arg = fit_argument(index, ty, None, target_ty)?;
        fit.score.record(&arg);
        if let Fit::Adapted(adapt) = arg {
            fit.args.push(arg_adaptation(0, adapt));
        }
    }
    Some(fit)
}

/// Check a shim event against a target event. Handlers are never adapted.
pub(crate) fn fit_event(
    index: &TypeIndex<'_>,
    handler: &TypeRef,
    candidate: &TargetMemberKind,
) -> Option<CallFit> {
    let TargetMemberKind::Event { handler: target } = candidate else {
        return None;
    };
    let mut fit = CallFit::default();
    if handler == target {
        return Some(fit);
    }
    if index.is_assignable(handler, target) {
        fit.score.assignable = 1;
        return Some(fit);
    }
    None
}

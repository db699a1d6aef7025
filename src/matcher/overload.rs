//! Overload resolution by arity-with-defaults.
//!
//! A target method or constructor with `m` parameters accepts a call with
//! `n <= m` arguments when the first `n` parameters accept the arguments
//! positionally and the remaining `m - n` parameters all have defaults.
//! Explicit arguments always pass through; only omitted trailing
//! parameters fall back to their defaults.
//!
//! Viable candidates are ranked by [`Score`]; the lowest score wins and a
//! tie for the lowest score is an ambiguity.

use crate::core::binding::{ArgAdaptation, Resolved, ReturnAdaptation};
use crate::core::index::TypeIndex;
use crate::core::member::{ShimParam, TargetParam};
use crate::core::types::TypeRef;
use crate::matcher::fit::{fit_argument, fit_return, Adapt, Fit};

/// Ranking of a viable candidate. Lower is better; fields compare in
/// declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    /// Positions matched by assignment rather than identity.
    pub assignable: usize,
    /// Adaptations inserted at argument or return boundaries.
    pub adapted: usize,
    /// Trailing parameters left to their defaults.
    pub defaulted: usize,
}

impl Score {
    pub(crate) fn record(&mut self, fit: &Fit) {
        match fit {
            Fit::Exact => {}
            Fit::Assignable => self.assignable += 1,
            Fit::Adapted(_) => self.adapted += 1,
        }
    }
}

/// A viable candidate with its ranking.
#[derive(Debug, Clone)]
pub struct Scored {
    pub resolved: Resolved,
    pub score: Score,
}

/// Adaptations found while checking a call shape.
#[derive(Debug, Default)]
pub(crate) struct CallFit {
    pub score: Score,
    pub args: Vec<ArgAdaptation>,
    pub ret: Option<ReturnAdaptation>,
    pub omitted: usize,
}

impl CallFit {
    pub(crate) fn apply(self, mut resolved: Resolved) -> Scored {
        resolved.args = self.args;
        resolved.ret = self.ret;
        resolved.omitted_defaults = self.omitted;
        Scored {
            resolved,
            score: self.score,
        }
    }
}

pub(crate) fn arg_adaptation(position: usize, adapt: Adapt) -> ArgAdaptation {
    ArgAdaptation {
        position,
        interface: adapt.interface,
        underlying: adapt.underlying,
        each: adapt.each,
        collect: adapt.collect,
    }
}

pub(crate) fn return_adaptation(adapt: Adapt) -> ReturnAdaptation {
    if adapt.each {
        ReturnAdaptation::WrapEach {
            interface: adapt.interface,
            underlying: adapt.underlying,
            collect: adapt.collect,
        }
    } else {
        ReturnAdaptation::Wrap {
            interface: adapt.interface,
            underlying: adapt.underlying,
        }
    }
}

/// Check a shim call shape against a target parameter list and return type.
pub(crate) fn fit_call(
    index: &TypeIndex<'_>,
    params: &[ShimParam],
    returns: &TypeRef,
    target_params: &[TargetParam],
    target_returns: &TypeRef,
) -> Option<CallFit> {
    let n = params.len();
    if target_params.len() < n {
        return None;
    }
    if target_params[n..].iter().any(|p| !p.has_default) {
        return None;
    }

    let mut fit = CallFit {
        omitted: target_params.len() - n,
        ..Default::default()
    };
    fit.score.defaulted = fit.omitted;

    for (position, (param, target)) in params.iter().zip(target_params).enumerate() {
        let arg = fit_argument(index, &param.ty, param.unwrap_to.as_ref(), &target.ty)?;
        fit.score.record(&arg);
        if let Fit::Adapted(adapt) = arg {
            fit.args.push(arg_adaptation(position, adapt));
        }
    }

    let ret = fit_return(index, target_returns, returns)?;
    fit.score.record(&ret);
    if let Fit::Adapted(adapt) = ret {
        fit.ret = Some(return_adaptation(adapt));
    }

    Some(fit)
}

/// Outcome of ranking: the unique best candidate, or the tied leaders.
#[derive(Debug)]
pub enum Selection {
    None,
    Best(Resolved),
    Ambiguous(Vec<Resolved>),
}

/// Pick the lowest-scored candidate. Ties for the lowest score are
/// ambiguous; candidate order never breaks a tie.
pub fn select(mut viable: Vec<Scored>) -> Selection {
    if viable.is_empty() {
        return Selection::None;
    }
    viable.sort_by_key(|s| s.score);
    let best = viable[0].score;
    let mut leaders: Vec<Resolved> = viable
        .into_iter()
        .take_while(|s| s.score == best)
        .map(|s| s.resolved)
        .collect();

    if leaders.len() == 1 {
        Selection::Best(leaders.remove(0))
    } else {
        Selection::Ambiguous(leaders)
    }
}

//! Member matching.
//!
//! Given one shim member and one target, find the target member that
//! implements it.
//!
//! # Algorithm Overview
//!
//! 1. **Name**: an override `target_name` wins over the member's own name
//! 2. **Route**: constructor members only look at constructors; members
//!    with a `proxy` override only look at static forwarders on the proxy
//!    type; everything else looks at the target's members (or the static
//!    members of an override `target_type`)
//! 3. **Filter**: same name, compatible kind, static/instance per the
//!    target's binding mode
//! 4. **Rank**: score viable candidates (see [`overload`]); a unique best
//!    binds, a tie is an ambiguity
//! 5. **Proxy fallback**: with no direct candidate, members reachable only
//!    through an explicitly implemented interface bind as proxies
//! 6. **Empty**: nothing matched
//!
//! Direct is preferred over proxy; constructor matching only runs for
//! constructor members.

pub mod accessors;
pub mod fit;
pub mod overload;

use thiserror::Error;

use crate::core::binding::{Binding, Resolved};
use crate::core::definition::ShimDefinition;
use crate::core::index::TypeIndex;
use crate::core::member::{ShimMember, ShimMemberKind, TargetMember, TargetMemberKind};
use crate::core::target::{BindingMode, Callee, ShimTarget};
use crate::core::types::TypeRef;
use accessors::{fit_event, fit_property, Accessors};
use overload::{fit_call, select, CallFit, Scored, Selection};

pub use overload::Score;

/// Matching failed in a way that must not be resolved silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("`{member}` matches {} equally ranked candidates", candidates.len())]
    Ambiguous {
        member: String,
        /// Signatures of the tied candidates.
        candidates: Vec<String>,
    },
}

/// Resolve one shim member against one target.
pub fn match_member(
    index: &TypeIndex<'_>,
    definition: &ShimDefinition,
    member: &ShimMember,
    target: &ShimTarget,
) -> Result<Binding, MatchError> {
    let matcher = Matcher { index, member };

    if definition.is_constructor_member(member) {
        let ty = member.target_type.as_ref().unwrap_or(&target.ty);
        return matcher.match_constructor(ty);
    }

    if let Some(proxy) = &member.proxy {
        if target.mode != BindingMode::Instance {
            return Ok(Binding::Empty);
        }
        return matcher.match_forwarder(proxy, &target.ty);
    }

    let (owner, want_static, callee) = match (&member.target_type, target.mode) {
        (Some(ty), _) => (ty, true, Callee::Static(ty.clone())),
        (None, BindingMode::Instance) => (&target.ty, false, Callee::Instance),
        (None, BindingMode::Static | BindingMode::Constructor) => {
            (&target.ty, true, Callee::Static(target.ty.clone()))
        }
    };
    matcher.match_members(owner, want_static, callee)
}

struct Matcher<'a, 'p> {
    index: &'a TypeIndex<'p>,
    member: &'a ShimMember,
}

impl Matcher<'_, '_> {
    fn ambiguous(&self, leaders: Vec<Resolved>) -> MatchError {
        MatchError::Ambiguous {
            member: self.member.signature(),
            candidates: leaders.iter().map(|r| r.member.signature()).collect(),
        }
    }

    /// Score a candidate against the member's declared shape.
    fn fit(&self, candidate: &TargetMember) -> Option<CallFit> {
        match &self.member.kind {
            ShimMemberKind::Method { params, returns } => match &candidate.kind {
                TargetMemberKind::Method {
                    params: target_params,
                    returns: target_returns,
                } => fit_call(self.index, params, returns, target_params, target_returns),
                _ => None,
            },
            ShimMemberKind::Property { ty, get, set, init } => fit_property(
                self.index,
                ty,
                Accessors {
                    get: *get,
                    set: *set,
                    init: *init,
                },
                &candidate.kind,
            ),
            ShimMemberKind::Event { handler } => fit_event(self.index, handler, &candidate.kind),
        }
    }

    fn rank<'m>(
        &self,
        candidates: impl Iterator<Item = &'m TargetMember>,
        callee: impl Fn(&TargetMember) -> Callee,
    ) -> Vec<Scored> {
        candidates
            .filter_map(|candidate| {
                let fit = self.fit(candidate)?;
                Some(fit.apply(Resolved::new(candidate.clone(), callee(candidate))))
            })
            .collect()
    }

    fn match_members(
        &self,
        owner: &TypeRef,
        want_static: bool,
        callee: Callee,
    ) -> Result<Binding, MatchError> {
        let name = self.member.effective_name();
        let pool: Vec<TargetMember> = self
            .index
            .members(owner)
            .into_iter()
            .filter(|m| m.name == name && m.is_static == want_static && !m.is_constructor())
            .collect();

        let direct = self.rank(pool.iter().filter(|m| m.via.is_none()), |_| callee.clone());
        match select(direct) {
            Selection::Best(resolved) => return Ok(Binding::Direct(resolved)),
            Selection::Ambiguous(leaders) => return Err(self.ambiguous(leaders)),
            Selection::None => {}
        }

        if want_static {
            return Ok(Binding::Empty);
        }

        let routed = self.rank(pool.iter().filter(|m| m.via.is_some()), |m| {
            Callee::Narrowed(m.via.clone().unwrap_or_else(|| owner.clone()))
        });
        match select(routed) {
            Selection::Best(resolved) => Ok(Binding::Proxy(resolved)),
            Selection::Ambiguous(leaders) => Err(self.ambiguous(leaders)),
            Selection::None => Ok(Binding::Empty),
        }
    }

    /// Static forwarders `static R Name(Target instance, args...)` on `proxy`.
    fn match_forwarder(&self, proxy: &TypeRef, target_ty: &TypeRef) -> Result<Binding, MatchError> {
        let ShimMemberKind::Method { params, returns } = &self.member.kind else {
            return Ok(Binding::Empty);
        };
        let name = self.member.effective_name();
        let members = self.index.members(proxy);

        let viable = members
            .iter()
            .filter(|m| m.name == name && m.is_static && !m.is_constructor())
            .filter_map(|candidate| {
                let TargetMemberKind::Method {
                    params: target_params,
                    returns: target_returns,
                } = &candidate.kind
                else {
                    return None;
                };
                let (receiver, rest) = target_params.split_first()?;
                if !self.index.is_assignable(target_ty, &receiver.ty) {
                    return None;
                }
                let fit = fit_call(self.index, params, returns, rest, target_returns)?;
                let resolved = Resolved::new(candidate.clone(), Callee::Forwarder(proxy.clone()));
                Some(fit.apply(resolved))
            })
            .collect();

        match select(viable) {
            Selection::Best(resolved) => Ok(Binding::Proxy(resolved)),
            Selection::Ambiguous(leaders) => Err(self.ambiguous(leaders)),
            Selection::None => Ok(Binding::Empty),
        }
    }

    /// Constructors declared directly on `ty`; the result is a new `ty`.
    fn match_constructor(&self, ty: &TypeRef) -> Result<Binding, MatchError> {
        let ShimMemberKind::Method { params, returns } = &self.member.kind else {
            return Ok(Binding::Empty);
        };
        let members = self.index.members(ty);

        let viable = members
            .iter()
            .filter(|m| m.is_constructor() && m.declaring_type == *ty)
            .filter_map(|candidate| {
                let fit = fit_call(self.index, params, returns, candidate.params(), ty)?;
                let resolved = Resolved::new(candidate.clone(), Callee::Constructor(ty.clone()));
                Some(fit.apply(resolved))
            })
            .collect();

        match select(viable) {
            Selection::Best(resolved) => Ok(Binding::Constructor(resolved)),
            Selection::Ambiguous(leaders) => Err(self.ambiguous(leaders)),
            Selection::None => Ok(Binding::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::ReturnAdaptation;
    use crate::core::program::{MemberDecl, MemberOverride, ParamDecl, Program, TypeDecl};
    use crate::test_support::{date_time_program, ty};

    fn definition(program: &Program, iface: &str) -> ShimDefinition {
        let decl = program
            .types
            .iter()
            .find(|t| t.name == ty(iface))
            .unwrap();
        match &decl.shim {
            Some(marker) => ShimDefinition::declared(decl, marker),
            None => ShimDefinition::implicit(decl),
        }
    }

    fn bind(program: &Program, iface: &str, member: &str, target: ShimTarget) -> Result<Binding, MatchError> {
        let index = TypeIndex::new(program);
        let def = definition(program, iface);
        let member = def.members.iter().find(|m| m.name == member).unwrap();
        match_member(&index, &def, member, &target)
    }

    fn instance(iface: &str, target: &str) -> ShimTarget {
        ShimTarget::new(ty(iface), ty(target), BindingMode::Instance)
    }

    #[test]
    fn test_property_binds_directly() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("IShimA")
                    .with_member(MemberDecl::property("Value", ty("string")).with_setter()),
            )
            .with_type(
                TypeDecl::class("Concrete")
                    .with_member(MemberDecl::property("Value", ty("string")).with_setter()),
            );

        let binding = bind(&program, "IShimA", "Value", instance("IShimA", "Concrete")).unwrap();
        let Binding::Direct(resolved) = binding else {
            panic!("expected direct binding, got {:?}", binding);
        };
        assert_eq!(resolved.member.name, "Value");
        assert_eq!(resolved.callee, Callee::Instance);
        assert!(resolved.args.is_empty());
        assert!(resolved.ret.is_none());
    }

    #[test]
    fn test_subtract_adapts_argument_and_return() {
        let program = date_time_program();
        let binding = bind(
            &program,
            "IDateTime",
            "Subtract",
            instance("IDateTime", "System.DateTime"),
        )
        .unwrap();

        let resolved = binding.resolved().unwrap();
        assert_eq!(resolved.args[0].interface, ty("IDateTime"));
        assert_eq!(resolved.args[0].underlying, ty("System.DateTime"));
        assert_eq!(
            resolved.ret,
            Some(ReturnAdaptation::Wrap {
                interface: ty("ITimeSpan"),
                underlying: ty("System.TimeSpan"),
            })
        );
        // The TimeSpan overload is not viable for an IDateTime argument
        // pinned by `unwrap_to`.
        assert_eq!(
            resolved.member.params()[0].ty,
            ty("System.DateTime")
        );
    }

    #[test]
    fn test_rename_never_binds_same_named_member() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("ICounter").with_member(
                    MemberDecl::method("Count", ty("int")).with_override(MemberOverride {
                        target_name: Some("Length".to_string()),
                        ..Default::default()
                    }),
                ),
            )
            .with_type(
                TypeDecl::class("Buffer")
                    .with_member(MemberDecl::method("Count", ty("int")))
                    .with_member(MemberDecl::method("Length", ty("int"))),
            );

        let binding = bind(&program, "ICounter", "Count", instance("ICounter", "Buffer")).unwrap();
        assert_eq!(binding.resolved().unwrap().member.name, "Length");
    }

    #[test]
    fn test_fewer_parameters_bind_overload_with_defaults() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("IText").with_member(
                    MemberDecl::method("Trim", ty("string"))
                        .with_param(ParamDecl::new("chars", ty("string"))),
                ),
            )
            .with_type(
                TypeDecl::class("Text").with_member(
                    MemberDecl::method("Trim", ty("string"))
                        .with_param(ParamDecl::new("chars", ty("string")))
                        .with_param(ParamDecl::new("ordinal", ty("bool")).with_default("false")),
                ),
            );

        let binding = bind(&program, "IText", "Trim", instance("IText", "Text")).unwrap();
        assert_eq!(binding.resolved().unwrap().omitted_defaults, 1);
    }

    #[test]
    fn test_fewest_defaults_breaks_rank_tie() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("IText").with_member(MemberDecl::method("Pad", ty("string"))),
            )
            .with_type(
                TypeDecl::class("Text")
                    .with_member(
                        MemberDecl::method("Pad", ty("string"))
                            .with_param(ParamDecl::new("width", ty("int")).with_default("0"))
                            .with_param(ParamDecl::new("fill", ty("char")).with_default("' '")),
                    )
                    .with_member(
                        MemberDecl::method("Pad", ty("string"))
                            .with_param(ParamDecl::new("width", ty("int")).with_default("0")),
                    ),
            );

        let binding = bind(&program, "IText", "Pad", instance("IText", "Text")).unwrap();
        assert_eq!(binding.resolved().unwrap().omitted_defaults, 1);
    }

    #[test]
    fn test_equal_rank_overloads_are_ambiguous() {
        let program = Program::new()
            .with_type(TypeDecl::interface("IWriter").with_member(
                MemberDecl::method("Write", ty("void")).with_param(ParamDecl::new("value", ty("Dog"))),
            ))
            .with_type(TypeDecl::interface("IAnimal"))
            .with_type(TypeDecl::interface("IPet"))
            .with_type(
                TypeDecl::class("Dog")
                    .with_interface(ty("IAnimal"))
                    .with_interface(ty("IPet")),
            )
            .with_type(
                TypeDecl::class("Writer")
                    .with_member(
                        MemberDecl::method("Write", ty("void"))
                            .with_param(ParamDecl::new("value", ty("IAnimal"))),
                    )
                    .with_member(
                        MemberDecl::method("Write", ty("void"))
                            .with_param(ParamDecl::new("value", ty("IPet"))),
                    ),
            );

        let err = bind(&program, "IWriter", "Write", instance("IWriter", "Writer")).unwrap_err();
        let MatchError::Ambiguous { candidates, .. } = err;
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_exact_beats_assignable() {
        let program = Program::new()
            .with_type(TypeDecl::interface("ISink").with_member(
                MemberDecl::method("Put", ty("void")).with_param(ParamDecl::new("v", ty("string"))),
            ))
            .with_type(
                TypeDecl::class("Sink")
                    .with_member(
                        MemberDecl::method("Put", ty("void"))
                            .with_param(ParamDecl::new("v", ty("object"))),
                    )
                    .with_member(
                        MemberDecl::method("Put", ty("void"))
                            .with_param(ParamDecl::new("v", ty("string"))),
                    ),
            );

        let binding = bind(&program, "ISink", "Put", instance("ISink", "Sink")).unwrap();
        assert_eq!(binding.resolved().unwrap().member.params()[0].ty, ty("string"));
    }

    #[test]
    fn test_static_mode_ignores_instance_members() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("IClock").with_member(MemberDecl::property("Now", ty("string"))),
            )
            .with_type(
                TypeDecl::class("Clock")
                    .with_member(MemberDecl::property("Now", ty("string"))),
            );

        let target = ShimTarget::new(ty("IClock"), ty("Clock"), BindingMode::Static);
        let binding = bind(&program, "IClock", "Now", target).unwrap();
        assert!(binding.is_empty());
    }

    #[test]
    fn test_explicit_interface_member_binds_as_proxy() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("IDisposer").with_member(MemberDecl::method("Dispose", ty("void"))),
            )
            .with_type(TypeDecl::interface("IDisposable"))
            .with_type(
                TypeDecl::class("Handle")
                    .with_interface(ty("IDisposable"))
                    .with_member(MemberDecl::method("Dispose", ty("void")).with_via(ty("IDisposable"))),
            );

        let binding = bind(&program, "IDisposer", "Dispose", instance("IDisposer", "Handle")).unwrap();
        let Binding::Proxy(resolved) = binding else {
            panic!("expected proxy binding, got {:?}", binding);
        };
        assert_eq!(resolved.callee, Callee::Narrowed(ty("IDisposable")));
    }

    #[test]
    fn test_forwarder_proxy_receives_instance_first() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("IRange").with_member(
                    MemberDecl::method("Clamp", ty("int"))
                        .with_param(ParamDecl::new("value", ty("int")))
                        .with_override(MemberOverride {
                            proxy: Some(ty("RangeExtensions")),
                            ..Default::default()
                        }),
                ),
            )
            .with_type(TypeDecl::class("Range"))
            .with_type(
                TypeDecl::class("RangeExtensions").with_member(
                    MemberDecl::method("Clamp", ty("int"))
                        .with_static(true)
                        .with_param(ParamDecl::new("range", ty("Range")))
                        .with_param(ParamDecl::new("value", ty("int"))),
                ),
            );

        let binding = bind(&program, "IRange", "Clamp", instance("IRange", "Range")).unwrap();
        let Binding::Proxy(resolved) = binding else {
            panic!("expected proxy binding, got {:?}", binding);
        };
        assert_eq!(resolved.callee, Callee::Forwarder(ty("RangeExtensions")));
    }

    #[test]
    fn test_constructor_member_binds_constructor() {
        let program = date_time_program();
        let index = TypeIndex::new(&program);
        let def = definition(&program, "IDateTimeFactory");
        let member = def.members.iter().find(|m| m.name == "Create").unwrap();
        let target = ShimTarget::new(
            ty("IDateTimeFactory"),
            ty("System.DateTime"),
            BindingMode::Constructor,
        );

        let binding = match_member(&index, &def, member, &target).unwrap();
        let Binding::Constructor(resolved) = binding else {
            panic!("expected constructor binding, got {:?}", binding);
        };
        assert_eq!(resolved.callee, Callee::Constructor(ty("System.DateTime")));
        assert_eq!(
            resolved.ret,
            Some(ReturnAdaptation::Wrap {
                interface: ty("IDateTime"),
                underlying: ty("System.DateTime"),
            })
        );
    }

    #[test]
    fn test_missing_member_is_empty() {
        let program = Program::new()
            .with_type(TypeDecl::interface("IShim").with_member(MemberDecl::method("Gone", ty("void"))))
            .with_type(TypeDecl::class("Concrete"));

        let binding = bind(&program, "IShim", "Gone", instance("IShim", "Concrete")).unwrap();
        assert!(binding.is_empty());
    }
}

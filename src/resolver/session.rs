//! The resolution session.
//!
//! A `Session` owns every definition and target found so far. Both are
//! append-only: re-registering a known definition or target is a no-op,
//! so running a pass twice over the same program changes nothing.
//! Bindings are not stored; each pass computes them afresh and hands them
//! back in a [`Resolution`].

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::core::binding::Binding;
use crate::core::definition::{ShimDefinition, ShimKind};
use crate::core::index::TypeIndex;
use crate::core::member::ShimMember;
use crate::core::program::Program;
use crate::core::target::{BindingMode, ShimTarget};
use crate::core::types::TypeRef;
use crate::matcher::{match_member, MatchError};
use crate::resolver::discovery::{discover, Discovered, ShimUse};
use crate::resolver::errors::{Diagnostics, ResolveError};
use crate::resolver::graph::ShimGraph;

/// Why a target exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetOrigin {
    /// Named by the interface's shim marker.
    Declared,
    /// Found at an adaptation call site.
    CallSite { location: Option<String> },
    /// Needed by another adapter's argument or return value.
    Nested { parent: String },
}

/// The binding of one interface member on one target.
#[derive(Debug, Clone, Serialize)]
pub struct MemberBinding {
    pub member: ShimMember,
    #[serde(flatten)]
    pub binding: Binding,
}

/// Every member binding of one (definition, target) pair.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPair {
    pub definition: ShimDefinition,
    pub target: ShimTarget,
    pub origin: TargetOrigin,
    pub members: Vec<MemberBinding>,
}

impl ResolvedPair {
    /// Every member bound.
    pub fn is_complete(&self) -> bool {
        self.members.iter().all(|m| !m.binding.is_empty())
    }

    /// Whether the pair gets an adapter.
    ///
    /// A pair with members of which none bound would only ever throw, so
    /// it is left out even when missing members are tolerated.
    pub fn is_emittable(&self) -> bool {
        self.members.is_empty() || self.members.iter().any(|m| !m.binding.is_empty())
    }

    pub fn binding(&self, member: &str) -> Option<&Binding> {
        self.members
            .iter()
            .find(|m| m.member.name == member)
            .map(|m| &m.binding)
    }

    pub fn adapter_name(&self) -> String {
        self.target.adapter_name()
    }
}

/// Output of one resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Pairs ordered by definition, then by target discovery order.
    pub pairs: Vec<ResolvedPair>,
    pub diagnostics: Diagnostics,
}

impl Resolution {
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn pair(&self, target: &ShimTarget) -> Option<&ResolvedPair> {
        self.pairs.iter().find(|p| p.target == *target)
    }

    /// Pairs of one interface.
    pub fn pairs_for<'a>(&'a self, interface: &'a TypeRef) -> impl Iterator<Item = &'a ResolvedPair> {
        self.pairs.iter().filter(move |p| p.definition.interface == *interface)
    }

    pub fn emittable(&self) -> impl Iterator<Item = &ResolvedPair> {
        self.pairs.iter().filter(|p| p.is_emittable())
    }

    pub fn binding_count(&self) -> usize {
        self.pairs
            .iter()
            .flat_map(|p| &p.members)
            .filter(|m| !m.binding.is_empty())
            .count()
    }
}

/// Append-only store of definitions and targets across passes.
#[derive(Debug, Default)]
pub struct Session {
    definitions: IndexMap<TypeRef, ShimDefinition>,
    targets: IndexSet<ShimTarget>,
    origins: HashMap<ShimTarget, TargetOrigin>,
    graph: ShimGraph,
    strict_unregistered: bool,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Report interfaces used without a shim marker as errors.
    pub fn with_strict_unregistered(mut self, strict: bool) -> Self {
        self.strict_unregistered = strict;
        self
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ShimDefinition> {
        self.definitions.values()
    }

    pub fn definition(&self, interface: &TypeRef) -> Option<&ShimDefinition> {
        self.definitions.get(interface)
    }

    /// Targets in first-discovery order.
    pub fn targets(&self) -> impl Iterator<Item = &ShimTarget> {
        self.targets.iter()
    }

    pub fn origin(&self, target: &ShimTarget) -> Option<&TargetOrigin> {
        self.origins.get(target)
    }

    pub fn graph(&self) -> &ShimGraph {
        &self.graph
    }

    /// Register a definition. The first registration of an interface wins.
    pub fn register_definition(&mut self, definition: ShimDefinition) -> bool {
        if self.definitions.contains_key(&definition.interface) {
            return false;
        }
        tracing::debug!("registered {} shim `{}`", definition.kind, definition.interface);
        self.definitions.insert(definition.interface.clone(), definition);
        true
    }

    /// Register a target. Returns `false` if the pair is already known.
    pub fn register_target(&mut self, target: ShimTarget, origin: TargetOrigin) -> bool {
        self.graph.add_pair(&target);
        if !self.targets.insert(target.clone()) {
            return false;
        }
        tracing::debug!("registered target {}", target);
        self.origins.insert(target, origin);
        true
    }

    /// Run one pass: discovery, graph construction and member resolution.
    pub fn resolve(&mut self, program: &Program) -> Resolution {
        let index = TypeIndex::new(program);
        let mut diagnostics = Diagnostics::new().strict(self.strict_unregistered);

        let mut uses = Vec::new();
        for item in discover(&index) {
            match item {
                Discovered::Definition(definition) => {
                    self.register_definition(definition);
                }
                Discovered::Use(shim_use) => uses.push(shim_use),
                Discovered::Rejected(error) => diagnostics.push(error),
            }
        }

        self.register_declared_targets();
        for shim_use in uses {
            self.register_use(&index, shim_use, &mut diagnostics);
        }
        self.check_missing_targets(&mut diagnostics);

        let mut resolved = self.close(&index, &mut diagnostics);

        let mut pairs = Vec::new();
        for interface in self.definitions.keys() {
            for target in self.targets.iter().filter(|t| t.interface == *interface) {
                if let Some(pair) = resolved.remove(target) {
                    pairs.push(pair);
                }
            }
        }

        tracing::info!(
            "resolved {} adapter pair(s) with {} error(s) and {} warning(s)",
            pairs.len(),
            diagnostics.error_count(),
            diagnostics.warning_count()
        );

        Resolution { pairs, diagnostics }
    }

    fn register_declared_targets(&mut self) {
        let declared: Vec<ShimTarget> = self
            .definitions
            .values()
            .filter_map(|d| {
                let ty = d.declared_target.clone()?;
                Some(ShimTarget::new(d.interface.clone(), ty, d.kind.binding_mode()))
            })
            .collect();
        for target in declared {
            self.register_target(target, TargetOrigin::Declared);
        }
    }

    fn register_use(&mut self, index: &TypeIndex<'_>, shim_use: ShimUse, diagnostics: &mut Diagnostics) {
        // Implicit definitions from earlier passes still warn on every pass.
        let marked = self
            .definitions
            .get(&shim_use.interface)
            .is_some_and(|d| d.registered);
        if !marked {
            diagnostics.push(ResolveError::UnregisteredShim {
                interface: shim_use.interface.to_string(),
                location: shim_use.location.clone(),
            });
            if !self.definitions.contains_key(&shim_use.interface) {
                if let Some(decl) = index.decl(&shim_use.interface) {
                    self.register_definition(ShimDefinition::implicit(decl));
                }
            }
        }
        let Some(definition) = self.definitions.get(&shim_use.interface) else {
            return;
        };

        let ty = match definition.kind {
            ShimKind::Instance => shim_use
                .argument_type
                .clone()
                .or_else(|| definition.declared_target.clone()),
            ShimKind::Static | ShimKind::ConstructorFactory => definition
                .declared_target
                .clone()
                .or_else(|| shim_use.argument_type.clone()),
        };
        let Some(ty) = ty else {
            diagnostics.push(ResolveError::MissingTarget {
                interface: definition.interface.to_string(),
                kind: definition.kind.to_string(),
            });
            return;
        };

        let target = ShimTarget::new(definition.interface.clone(), ty, definition.kind.binding_mode());
        self.register_target(
            target,
            TargetOrigin::CallSite {
                location: shim_use.location,
            },
        );
    }

    fn check_missing_targets(&self, diagnostics: &mut Diagnostics) {
        for definition in self.definitions.values() {
            if definition.kind == ShimKind::Instance {
                continue;
            }
            let has_target = self.targets.iter().any(|t| t.interface == definition.interface);
            if !has_target {
                diagnostics.push(ResolveError::MissingTarget {
                    interface: definition.interface.to_string(),
                    kind: definition.kind.to_string(),
                });
            }
        }
    }

    /// Resolve every known target, following nested adaptations until no
    /// new pair appears.
    fn close(
        &mut self,
        index: &TypeIndex<'_>,
        diagnostics: &mut Diagnostics,
    ) -> HashMap<ShimTarget, ResolvedPair> {
        let mut queue: VecDeque<ShimTarget> = self.targets.iter().cloned().collect();
        let mut visited = HashSet::new();
        let mut resolved = HashMap::new();

        while let Some(target) = queue.pop_front() {
            if !visited.insert(target.clone()) {
                continue;
            }
            let Some(definition) = self.definitions.get(&target.interface).cloned() else {
                continue;
            };
            if index.resolve(&target.ty).is_none() {
                diagnostics.push(ResolveError::UnknownType {
                    name: target.ty.to_string(),
                    referenced_by: format!("the adapter for `{}`", target.interface),
                });
                continue;
            }

            let mut members = Vec::with_capacity(definition.members.len());
            for member in &definition.members {
                let binding = self.bind_member(index, &definition, member, &target, diagnostics);

                for (interface, underlying) in binding.nested_pairs() {
                    let Some(nested) = self.register_nested(index, &target, interface, underlying)
                    else {
                        continue;
                    };
                    if !visited.contains(&nested) {
                        queue.push_back(nested);
                    }
                }

                members.push(MemberBinding {
                    member: member.clone(),
                    binding,
                });
            }

            let origin = self
                .origins
                .get(&target)
                .cloned()
                .unwrap_or(TargetOrigin::Declared);
            resolved.insert(
                target.clone(),
                ResolvedPair {
                    definition,
                    target,
                    origin,
                    members,
                },
            );
        }

        resolved
    }

    fn bind_member(
        &self,
        index: &TypeIndex<'_>,
        definition: &ShimDefinition,
        member: &ShimMember,
        target: &ShimTarget,
        diagnostics: &mut Diagnostics,
    ) -> Binding {
        match match_member(index, definition, member, target) {
            Ok(binding) => {
                if binding.is_empty() && !definition.options.ignore_missing_members {
                    diagnostics.push(ResolveError::UnresolvedMember {
                        interface: definition.interface.to_string(),
                        member: member.signature(),
                        target: target.ty.to_string(),
                    });
                }
                binding
            }
            Err(MatchError::Ambiguous { candidates, .. }) => {
                diagnostics.push(ResolveError::AmbiguousOverload {
                    interface: definition.interface.to_string(),
                    member: member.name.clone(),
                    target: target.ty.to_string(),
                    candidates,
                });
                Binding::Empty
            }
        }
    }

    /// Register the pair a nested adaptation needs, implicitly defining
    /// the interface as an instance shim if it carries no marker.
    fn register_nested(
        &mut self,
        index: &TypeIndex<'_>,
        parent: &ShimTarget,
        interface: TypeRef,
        underlying: TypeRef,
    ) -> Option<ShimTarget> {
        if !self.definitions.contains_key(&interface) {
            let decl = index.decl(&interface)?;
            self.register_definition(ShimDefinition::implicit(decl));
        }

        let nested = ShimTarget::new(interface, underlying, BindingMode::Instance);
        if self.register_target(
            nested.clone(),
            TargetOrigin::Nested {
                parent: parent.to_string(),
            },
        ) {
            tracing::debug!("nested pair {} needed by {}", nested, parent);
        }
        // An adapter unwrapping its own interface needs no edge.
        if nested != *parent {
            self.graph.add_edge(parent, &nested);
        }
        Some(nested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::ReturnAdaptation;
    use crate::core::program::{CallSite, MemberDecl, ShimMarker, TypeDecl};
    use crate::test_support::{date_time_program, ty};

    fn shim_a_program() -> Program {
        Program::new()
            .with_type(
                TypeDecl::interface("IShimA")
                    .with_shim(ShimMarker {
                        kind: ShimKind::Instance,
                        target: None,
                        ignore_missing_members: false,
                    })
                    .with_member(MemberDecl::property("Value", ty("string")).with_setter()),
            )
            .with_type(
                TypeDecl::class("Concrete")
                    .with_member(MemberDecl::property("Value", ty("string")).with_setter()),
            )
            .with_call_site(CallSite::new(ty("IShimA"), ty("Concrete")).at("Program.cs:3"))
    }

    #[test]
    fn test_every_member_of_complete_pair_binds_once() {
        let mut session = Session::new();
        let resolution = session.resolve(&shim_a_program());

        assert!(resolution.is_ok());
        assert_eq!(resolution.pairs.len(), 1);
        let pair = &resolution.pairs[0];
        assert!(pair.is_complete());
        assert_eq!(pair.members.len(), 1);
        assert!(matches!(pair.binding("Value"), Some(Binding::Direct(_))));
        assert_eq!(
            pair.origin,
            TargetOrigin::CallSite {
                location: Some("Program.cs:3".to_string())
            }
        );
    }

    #[test]
    fn test_rediscovery_is_a_no_op() {
        let program = shim_a_program().with_call_site(CallSite::new(ty("IShimA"), ty("Concrete")));
        let mut session = Session::new();

        let first = session.resolve(&program);
        let second = session.resolve(&program);

        assert_eq!(session.targets().count(), 1);
        assert_eq!(session.definitions().count(), 1);
        assert_eq!(first.pairs.len(), second.pairs.len());
        assert_eq!(first.binding_count(), second.binding_count());
    }

    #[test]
    fn test_nested_pairs_are_closed_over() {
        let mut session = Session::new();
        let resolution = session.resolve(&date_time_program());

        assert!(resolution.is_ok(), "{:?}", resolution.diagnostics);
        let time_span = ShimTarget::new(ty("ITimeSpan"), ty("System.TimeSpan"), BindingMode::Instance);
        let pair = resolution.pair(&time_span).expect("nested pair resolved");
        assert!(matches!(pair.origin, TargetOrigin::Nested { .. }));

        let date_time = ShimTarget::new(ty("IDateTime"), ty("System.DateTime"), BindingMode::Instance);
        assert!(session
            .graph()
            .dependencies(&date_time)
            .contains(&&time_span));

        let subtract = resolution.pair(&date_time).unwrap().binding("Subtract").unwrap();
        assert!(matches!(
            subtract.resolved().unwrap().ret,
            Some(ReturnAdaptation::Wrap { .. })
        ));
    }

    #[test]
    fn test_pairs_follow_definition_order() {
        let mut session = Session::new();
        let resolution = session.resolve(&date_time_program());
        let order: Vec<_> = resolution
            .pairs
            .iter()
            .map(|p| p.definition.interface.to_string())
            .collect();
        assert_eq!(order, vec!["IDateTime", "IDateTimeFactory", "ITimeSpan"]);
    }

    #[test]
    fn test_unregistered_interface_warns_and_still_resolves() {
        let program = Program::new()
            .with_type(TypeDecl::interface("IPlain").with_member(MemberDecl::property("Value", ty("int"))))
            .with_type(TypeDecl::class("Concrete").with_member(MemberDecl::property("Value", ty("int"))))
            .with_call_site(CallSite::new(ty("IPlain"), ty("Concrete")).at("x.cs:9"));

        let resolution = Session::new().resolve(&program);
        assert!(resolution.is_ok());
        assert_eq!(resolution.diagnostics.warning_count(), 1);
        assert_eq!(resolution.pairs.len(), 1);
        assert!(!resolution.pairs[0].definition.registered);

        let strict = Session::new().with_strict_unregistered(true).resolve(&program);
        assert!(!strict.is_ok());
    }

    #[test]
    fn test_strict_session_reports_unregistered_shim_every_pass() {
        let program = Program::new()
            .with_type(TypeDecl::interface("IPlain").with_member(MemberDecl::property("Value", ty("int"))))
            .with_type(TypeDecl::class("Concrete").with_member(MemberDecl::property("Value", ty("int"))))
            .with_call_site(CallSite::new(ty("IPlain"), ty("Concrete")).at("x.cs:9"));

        let mut session = Session::new().with_strict_unregistered(true);
        let first = session.resolve(&program);
        let second = session.resolve(&program);
        assert!(!first.is_ok());
        assert_eq!(first.is_ok(), second.is_ok());
        assert_eq!(first.diagnostics.error_count(), second.diagnostics.error_count());

        let mut lenient = Session::new();
        lenient.resolve(&program);
        assert_eq!(lenient.resolve(&program).diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_non_interface_shim_produces_no_binding() {
        let program = Program::new()
            .with_type(TypeDecl::class("Concrete").with_member(MemberDecl::property("Value", ty("int"))))
            .with_call_site(CallSite::new(ty("Concrete"), ty("Concrete")));

        let resolution = Session::new().resolve(&program);
        assert!(!resolution.is_ok());
        assert!(resolution.pairs.is_empty());
        assert!(matches!(
            resolution.diagnostics.iter().next(),
            Some(ResolveError::NotAnInterface { .. })
        ));
    }

    #[test]
    fn test_missing_member_is_reported_unless_tolerated() {
        let decl = |ignore| {
            TypeDecl::interface("IShim")
                .with_shim(ShimMarker {
                    kind: ShimKind::Instance,
                    target: Some(ty("Concrete")),
                    ignore_missing_members: ignore,
                })
                .with_member(MemberDecl::method("Present", ty("void")))
                .with_member(MemberDecl::method("Absent", ty("void")))
        };
        let concrete = TypeDecl::class("Concrete").with_member(MemberDecl::method("Present", ty("void")));

        let strict = Program::new().with_type(decl(false)).with_type(concrete.clone());
        let resolution = Session::new().resolve(&strict);
        assert!(matches!(
            resolution.diagnostics.iter().next(),
            Some(ResolveError::UnresolvedMember { member, .. }) if member == "void Absent()"
        ));

        let tolerant = Program::new().with_type(decl(true)).with_type(concrete);
        let resolution = Session::new().resolve(&tolerant);
        assert!(resolution.is_ok());
        assert!(resolution.pairs[0].is_emittable());
        assert!(!resolution.pairs[0].is_complete());
    }

    #[test]
    fn test_static_shim_without_target_is_an_error() {
        let program = Program::new().with_type(TypeDecl::interface("IClock").with_shim(ShimMarker {
            kind: ShimKind::Static,
            target: None,
            ignore_missing_members: false,
        }));
        let resolution = Session::new().resolve(&program);
        assert!(matches!(
            resolution.diagnostics.iter().next(),
            Some(ResolveError::MissingTarget { .. })
        ));
    }
}

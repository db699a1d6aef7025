//! Discovery: classify every declaration and call site of a program.
//!
//! Each item is classified on its own, in parallel, against the read-only
//! type index; nothing is registered here. The session merges the results
//! afterwards in source order (declarations first, then call sites).

use rayon::prelude::*;

use crate::core::definition::ShimDefinition;
use crate::core::index::TypeIndex;
use crate::core::program::{CallSite, TypeDecl, TypeKind};
use crate::core::types::TypeRef;
use crate::resolver::errors::ResolveError;

/// A call site adapting a value onto a known interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimUse {
    pub interface: TypeRef,
    pub argument_type: Option<TypeRef>,
    pub location: Option<String>,
}

/// One classified item.
#[derive(Debug, Clone)]
pub enum Discovered {
    /// An interface carrying a shim marker.
    Definition(ShimDefinition),
    /// An adaptation call site.
    Use(ShimUse),
    /// A declaration or call site that cannot take part in resolution.
    Rejected(ResolveError),
}

/// Classify every declaration and call site of the indexed program.
pub fn discover(index: &TypeIndex<'_>) -> Vec<Discovered> {
    let program = index.program();

    let declarations: Vec<Discovered> = program
        .types
        .par_iter()
        .flat_map_iter(|decl| classify_declaration(index, decl))
        .collect();

    let uses: Vec<Discovered> = program
        .call_sites
        .par_iter()
        .map(|site| classify_call_site(index, site))
        .collect();

    tracing::debug!(
        "discovered {} declaration item(s) and {} call site(s)",
        declarations.len(),
        uses.len()
    );

    declarations.into_iter().chain(uses).collect()
}

fn unknown(index: &TypeIndex<'_>, ty: &TypeRef, referenced_by: impl Fn() -> String) -> Option<Discovered> {
    if index.resolve(ty).is_some() {
        return None;
    }
    Some(Discovered::Rejected(ResolveError::UnknownType {
        name: ty.to_string(),
        referenced_by: referenced_by(),
    }))
}

fn classify_declaration(index: &TypeIndex<'_>, decl: &TypeDecl) -> Vec<Discovered> {
    let Some(marker) = &decl.shim else {
        return Vec::new();
    };

    if decl.kind != TypeKind::Interface {
        return vec![Discovered::Rejected(ResolveError::NotAnInterface {
            name: decl.name.to_string(),
            kind: decl.kind.to_string(),
            location: None,
        })];
    }

    let mut out = Vec::new();
    if let Some(target) = &marker.target {
        out.extend(unknown(index, target, || {
            format!("the shim marker of `{}`", decl.name)
        }));
    }
    for member in &decl.members {
        let Some(overrides) = &member.shim else {
            continue;
        };
        for ty in overrides.target_type.iter().chain(overrides.proxy.iter()) {
            out.extend(unknown(index, ty, || {
                format!("the override on `{}.{}`", decl.name, member.name)
            }));
        }
    }

    out.push(Discovered::Definition(ShimDefinition::declared(decl, marker)));
    out
}

fn classify_call_site(index: &TypeIndex<'_>, site: &CallSite) -> Discovered {
    let referenced_by = || match &site.location {
        Some(location) => format!("the call site at {}", location),
        None => "a call site".to_string(),
    };

    let Some(kind) = index.kind(&site.interface) else {
        return Discovered::Rejected(ResolveError::UnknownType {
            name: site.interface.to_string(),
            referenced_by: referenced_by(),
        });
    };
    if kind != TypeKind::Interface {
        return Discovered::Rejected(ResolveError::NotAnInterface {
            name: site.interface.to_string(),
            kind: kind.to_string(),
            location: site.location.clone(),
        });
    }
    if let Some(argument) = &site.argument_type {
        if let Some(rejected) = unknown(index, argument, referenced_by) {
            return rejected;
        }
    }

    Discovered::Use(ShimUse {
        interface: site.interface.clone(),
        argument_type: site.argument_type.clone(),
        location: site.location.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::program::{CallSite, Program, ShimMarker};
    use crate::core::definition::ShimKind;
    use crate::test_support::ty;

    fn marker() -> ShimMarker {
        ShimMarker {
            kind: ShimKind::Instance,
            target: None,
            ignore_missing_members: false,
        }
    }

    #[test]
    fn test_marked_interface_becomes_definition() {
        let program = Program::new()
            .with_type(TypeDecl::interface("IShim").with_shim(marker()))
            .with_type(TypeDecl::class("Plain"));
        let index = TypeIndex::new(&program);

        let found = discover(&index);
        assert_eq!(found.len(), 1);
        assert!(matches!(&found[0], Discovered::Definition(d) if d.interface == ty("IShim")));
    }

    #[test]
    fn test_marker_on_class_is_rejected() {
        let program = Program::new().with_type(TypeDecl::class("Clock").with_shim(marker()));
        let index = TypeIndex::new(&program);

        let found = discover(&index);
        assert!(matches!(
            &found[0],
            Discovered::Rejected(ResolveError::NotAnInterface { name, .. }) if name == "Clock"
        ));
    }

    #[test]
    fn test_call_sites_follow_declarations_in_source_order() {
        let program = Program::new()
            .with_type(TypeDecl::interface("IA").with_shim(marker()))
            .with_type(TypeDecl::interface("IB"))
            .with_type(TypeDecl::class("A"))
            .with_call_site(CallSite::new(ty("IB"), ty("A")).at("b.cs:1"))
            .with_call_site(CallSite::new(ty("IA"), ty("A")).at("a.cs:1"))
            .with_call_site(CallSite::new(ty("A"), ty("A")).at("c.cs:1"))
            .with_call_site(CallSite::new(ty("IMissing"), ty("A")));
        let index = TypeIndex::new(&program);

        let found = discover(&index);
        assert_eq!(found.len(), 5);
        assert!(matches!(&found[0], Discovered::Definition(_)));
        assert!(matches!(&found[1], Discovered::Use(u) if u.interface == ty("IB")));
        assert!(matches!(&found[2], Discovered::Use(u) if u.interface == ty("IA")));
        assert!(matches!(
            &found[3],
            Discovered::Rejected(ResolveError::NotAnInterface { location: Some(l), .. }) if l == "c.cs:1"
        ));
        assert!(matches!(
            &found[4],
            Discovered::Rejected(ResolveError::UnknownType { name, .. }) if name == "IMissing"
        ));
    }

    #[test]
    fn test_unknown_declared_target_is_reported() {
        let mut m = marker();
        m.target = Some(ty("Nowhere"));
        let program = Program::new().with_type(TypeDecl::interface("IShim").with_shim(m));
        let index = TypeIndex::new(&program);

        let found = discover(&index);
        assert!(matches!(
            &found[0],
            Discovered::Rejected(ResolveError::UnknownType { name, .. }) if name == "Nowhere"
        ));
        assert!(matches!(&found[1], Discovered::Definition(_)));
    }
}

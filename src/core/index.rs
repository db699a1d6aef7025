//! Name resolution over a program model.
//!
//! `TypeIndex` answers the questions the matcher and resolver ask about
//! types: which declaration a reference names (with generic arguments
//! substituted), which members a type exposes including inherited ones,
//! and whether a value of one type is assignable to another.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::member::TargetMember;
use crate::core::program::{Program, TypeDecl, TypeKind};
use crate::core::types::TypeRef;

/// Sequence interfaces an array converts to implicitly.
const ARRAY_INTERFACES: &[&str] = &[
    "IEnumerable",
    "ICollection",
    "IList",
    "IReadOnlyCollection",
    "IReadOnlyList",
];

/// Maximum base-class chain walked before giving up on a cyclic model.
const MAX_BASE_DEPTH: usize = 64;

/// A declaration together with the substitution for its generic parameters.
#[derive(Debug, Clone)]
pub struct ResolvedDecl<'p> {
    pub decl: &'p TypeDecl,
    pub subst: HashMap<String, TypeRef>,
}

/// Lookup structure over a program's type declarations.
#[derive(Debug)]
pub struct TypeIndex<'p> {
    program: &'p Program,
    by_name: HashMap<&'p str, usize>,
}

impl<'p> TypeIndex<'p> {
    /// Index the program's declarations by name.
    pub fn new(program: &'p Program) -> Self {
        let mut by_name = HashMap::new();
        for (i, decl) in program.types.iter().enumerate() {
            if let Some(name) = decl.name.name() {
                by_name.entry(name).or_insert(i);
            }
        }
        TypeIndex { program, by_name }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Find the declaration a type reference names.
    ///
    /// The reference must supply exactly as many generic arguments as the
    /// declaration has parameters.
    pub fn resolve(&self, ty: &TypeRef) -> Option<ResolvedDecl<'p>> {
        let TypeRef::Named { name, args } = ty else {
            return None;
        };
        let decl = &self.program.types[*self.by_name.get(name.as_str())?];
        let params = decl.generic_params();
        if params.len() != args.len() {
            return None;
        }
        let subst = params.into_iter().zip(args.iter().cloned()).collect();
        Some(ResolvedDecl { decl, subst })
    }

    pub fn decl(&self, ty: &TypeRef) -> Option<&'p TypeDecl> {
        self.resolve(ty).map(|r| r.decl)
    }

    pub fn kind(&self, ty: &TypeRef) -> Option<TypeKind> {
        self.decl(ty).map(|d| d.kind)
    }

    pub fn is_interface(&self, ty: &TypeRef) -> bool {
        self.kind(ty) == Some(TypeKind::Interface)
    }

    /// Members of `ty` and its base classes, most derived first.
    ///
    /// A base member hidden by a derived member with the same name and
    /// parameter types is omitted.
    pub fn members(&self, ty: &TypeRef) -> Vec<TargetMember> {
        let mut members: Vec<TargetMember> = Vec::new();
        let mut current = Some(ty.clone());
        let mut depth = 0;

        while let Some(owner) = current.take() {
            let Some(resolved) = self.resolve(&owner) else {
                break;
            };
            for decl in &resolved.decl.members {
                let member = TargetMember::from_decl(decl, &owner, &resolved.subst);
                let hidden = members.iter().any(|m| m.hides(&member));
                if !hidden {
                    members.push(member);
                }
            }

            depth += 1;
            if depth >= MAX_BASE_DEPTH {
                break;
            }
            current = resolved.decl.base.as_ref().map(|b| b.substitute(&resolved.subst));
        }

        members
    }

    /// All transitive supertypes: base classes first, then interfaces,
    /// breadth-first, without duplicates.
    pub fn supertypes(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([ty.clone()]);

        while let Some(next) = queue.pop_front() {
            let Some(resolved) = self.resolve(&next) else {
                continue;
            };
            let parents = resolved
                .decl
                .base
                .iter()
                .chain(resolved.decl.interfaces.iter())
                .map(|p| p.substitute(&resolved.subst));
            for parent in parents {
                if parent != *ty && seen.insert(parent.clone()) {
                    out.push(parent.clone());
                    queue.push_back(parent);
                }
            }
        }

        out
    }

    /// Whether a value of type `from` can be passed where `to` is expected.
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        if from == to || to.is_object() {
            return true;
        }
        if from.is_void() || to.is_void() {
            return false;
        }

        match (from, to) {
            (TypeRef::Nullable(a), TypeRef::Nullable(b)) => self.is_assignable(a, b),
            (_, TypeRef::Nullable(b)) => self.is_assignable(from, b),
            (TypeRef::Array(a), TypeRef::Array(b)) => self.is_assignable(a, b),
            (TypeRef::Array(a), TypeRef::Named { .. }) => {
                let is_array_interface = to
                    .simple_name()
                    .is_some_and(|n| ARRAY_INTERFACES.contains(&n));
                match to.sequence_element() {
                    Some(b) if is_array_interface => self.is_assignable(a, b),
                    _ => false,
                }
            }
            (TypeRef::Named { .. }, TypeRef::Named { .. }) => {
                if self.is_covariant_sequence(from, to) {
                    return true;
                }
                self.supertypes(from).iter().any(|s| s == to || self.is_covariant_sequence(s, to))
            }
            _ => false,
        }
    }

    /// `IEnumerable<Derived>` to `IEnumerable<Base>`.
    fn is_covariant_sequence(&self, from: &TypeRef, to: &TypeRef) -> bool {
        if from.simple_name() != Some("IEnumerable") || to.simple_name() != Some("IEnumerable") {
            return false;
        }
        match (from.sequence_element(), to.sequence_element()) {
            (Some(a), Some(b)) => a != b && self.is_assignable(a, b),
            _ => false,
        }
    }
}

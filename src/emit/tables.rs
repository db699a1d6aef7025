//! Global lookup tables.
//!
//! Two tables select an adapter at runtime:
//! - **create**: (interface, declared type) to a static or factory adapter
//! - **adapt**: (interface, runtime type) to an instance adapter, exact
//!   matches only
//!
//! When the runtime type has no exact entry, the **fallback** list of the
//! interface is scanned in order for the first entry whose underlying type
//! the runtime type is assignable to. More derived types come first, so
//! the most specific adapter wins.

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::index::TypeIndex;
use crate::core::target::BindingMode;
use crate::core::types::TypeRef;
use crate::resolver::ResolvedPair;

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub interface: TypeRef,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub adapter: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LookupTables {
    pub create: Vec<TableEntry>,
    pub adapt: Vec<TableEntry>,
    /// Per interface, instance entries ordered most derived first.
    pub fallback: IndexMap<TypeRef, Vec<TableEntry>>,
}

impl LookupTables {
    /// Build the tables for the adapters being emitted.
    pub fn build(adapters: &[&ResolvedPair], index: &TypeIndex<'_>) -> Self {
        let mut tables = LookupTables::default();

        for pair in adapters {
            let entry = TableEntry {
                interface: pair.target.interface.clone(),
                ty: pair.target.ty.clone(),
                adapter: pair.adapter_name(),
            };
            let table = match pair.target.mode {
                BindingMode::Instance => &mut tables.adapt,
                BindingMode::Static | BindingMode::Constructor => &mut tables.create,
            };
            if !table.iter().any(|e| e.interface == entry.interface && e.ty == entry.ty) {
                table.push(entry);
            }
        }

        for entry in &tables.adapt {
            tables
                .fallback
                .entry(entry.interface.clone())
                .or_default()
                .push(entry.clone());
        }
        for entries in tables.fallback.values_mut() {
            // Stable: equally derived types keep discovery order.
            entries.sort_by_key(|e| std::cmp::Reverse(index.supertypes(&e.ty).len()));
        }

        tables
    }

    pub fn create_entry(&self, interface: &TypeRef, ty: &TypeRef) -> Option<&TableEntry> {
        self.create
            .iter()
            .find(|e| e.interface == *interface && e.ty == *ty)
    }

    pub fn adapt_entry(&self, interface: &TypeRef, ty: &TypeRef) -> Option<&TableEntry> {
        self.adapt
            .iter()
            .find(|e| e.interface == *interface && e.ty == *ty)
    }

    pub fn fallback_for(&self, interface: &TypeRef) -> &[TableEntry] {
        self.fallback.get(interface).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::ShimKind;
    use crate::core::program::{CallSite, MemberDecl, Program, TypeDecl};
    use crate::resolver::Session;
    use crate::test_support::{date_time_program, marker, ty};

    #[test]
    fn test_static_and_factory_shims_go_to_create_table() {
        let program = date_time_program();
        let index = TypeIndex::new(&program);
        let resolution = Session::new().resolve(&program);
        let adapters: Vec<_> = resolution.emittable().collect();
        let tables = LookupTables::build(&adapters, &index);

        assert_eq!(tables.create.len(), 1);
        assert_eq!(tables.create[0].adapter, "IDateTimeFactory__System_DateTime_Factory");
        assert!(tables
            .adapt_entry(&ty("ITimeSpan"), &ty("System.TimeSpan"))
            .is_some());
        assert!(tables.create_entry(&ty("IDateTime"), &ty("System.DateTime")).is_none());
    }

    #[test]
    fn test_fallback_orders_most_derived_first() {
        let program = Program::new()
            .with_type(
                TypeDecl::interface("INamed")
                    .with_shim(marker(ShimKind::Instance, None))
                    .with_member(MemberDecl::property("Name", ty("string"))),
            )
            .with_type(TypeDecl::class("Animal").with_member(MemberDecl::property("Name", ty("string"))))
            .with_type(TypeDecl::class("Dog").with_base(ty("Animal")))
            .with_call_site(CallSite::new(ty("INamed"), ty("Animal")))
            .with_call_site(CallSite::new(ty("INamed"), ty("Dog")));
        let index = TypeIndex::new(&program);
        let resolution = Session::new().resolve(&program);
        assert!(resolution.is_ok());
        let adapters: Vec<_> = resolution.emittable().collect();
        let tables = LookupTables::build(&adapters, &index);

        let order: Vec<_> = tables
            .fallback_for(&ty("INamed"))
            .iter()
            .map(|e| e.ty.to_string())
            .collect();
        assert_eq!(order, vec!["Dog", "Animal"]);
        assert_eq!(tables.adapt.len(), 2);
    }
}

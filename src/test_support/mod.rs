//! Test utilities for shimbind unit tests.
//!
//! Program models are built with the `with_*` builders so each test shows
//! exactly the declarations it depends on.
//!
//! # Example
//!
//! ```rust,ignore
//! use shimbind::test_support::{date_time_program, ty};
//!
//! #[test]
//! fn test_example() {
//!     let program = date_time_program();
//!     let resolution = Session::new().resolve(&program);
//!     assert!(resolution.is_ok());
//! }
//! ```

pub mod fixtures;

use crate::core::definition::ShimKind;
use crate::core::program::{CallSite, MemberDecl, ParamDecl, Program, ShimMarker, TypeDecl, TypeKind};
use crate::core::types::TypeRef;

pub use fixtures::*;

/// Parse a type reference, panicking on malformed input.
pub fn ty(s: &str) -> TypeRef {
    TypeRef::parse(s).unwrap_or_else(|e| panic!("bad type `{}` in test: {}", s, e))
}

/// An interface-level shim marker.
pub fn marker(kind: ShimKind, target: Option<&str>) -> ShimMarker {
    ShimMarker {
        kind,
        target: target.map(ty),
        ignore_missing_members: false,
    }
}

/// The date/time scenario.
///
/// - `IDateTime` is an instance shim over `System.DateTime` whose
///   `Subtract` takes another `IDateTime` (unwrapped to `System.DateTime`)
///   and returns an `ITimeSpan`
/// - `ITimeSpan` carries no marker; it is only reached through `Subtract`
/// - `IDateTimeFactory` constructs `System.DateTime` values
pub fn date_time_program() -> Program {
    Program::new()
        .with_type(
            TypeDecl::interface("IDateTime")
                .with_shim(marker(ShimKind::Instance, Some("System.DateTime")))
                .with_member(MemberDecl::property("Year", ty("int")))
                .with_member(
                    MemberDecl::method("Subtract", ty("ITimeSpan")).with_param(
                        ParamDecl::new("value", ty("IDateTime"))
                            .with_unwrap_to(ty("System.DateTime")),
                    ),
                )
                .with_member(
                    MemberDecl::method("AddDays", ty("IDateTime"))
                        .with_param(ParamDecl::new("value", ty("double"))),
                ),
        )
        .with_type(
            TypeDecl::interface("ITimeSpan")
                .with_member(MemberDecl::property("TotalDays", ty("double")))
                .with_member(MemberDecl::property("Days", ty("int"))),
        )
        .with_type(
            TypeDecl::interface("IDateTimeFactory")
                .with_shim(marker(ShimKind::ConstructorFactory, Some("System.DateTime")))
                .with_member(
                    MemberDecl::method("Create", ty("IDateTime"))
                        .with_param(ParamDecl::new("ticks", ty("long"))),
                ),
        )
        .with_type(
            TypeDecl::new(ty("System.DateTime"), TypeKind::Struct)
                .with_member(
                    MemberDecl::constructor().with_param(ParamDecl::new("ticks", ty("long"))),
                )
                .with_member(
                    MemberDecl::constructor()
                        .with_param(ParamDecl::new("year", ty("int")))
                        .with_param(ParamDecl::new("month", ty("int")))
                        .with_param(ParamDecl::new("day", ty("int"))),
                )
                .with_member(MemberDecl::property("Year", ty("int")))
                .with_member(
                    MemberDecl::method("Subtract", ty("System.TimeSpan"))
                        .with_param(ParamDecl::new("value", ty("System.DateTime"))),
                )
                .with_member(
                    MemberDecl::method("Subtract", ty("System.DateTime"))
                        .with_param(ParamDecl::new("value", ty("System.TimeSpan"))),
                )
                .with_member(
                    MemberDecl::method("AddDays", ty("System.DateTime"))
                        .with_param(ParamDecl::new("value", ty("double"))),
                )
                .with_member(MemberDecl::property("Now", ty("System.DateTime")).with_static(true)),
        )
        .with_type(
            TypeDecl::new(ty("System.TimeSpan"), TypeKind::Struct)
                .with_member(MemberDecl::property("TotalDays", ty("double")))
                .with_member(MemberDecl::property("Days", ty("int"))),
        )
        .with_call_site(
            CallSite::new(ty("IDateTime"), ty("System.DateTime")).at("Program.cs:12"),
        )
}

/// A sequence-returning scenario: `IInventory.Items` returns
/// `IEnumerable<IItem>` over a target returning `List<Item>`.
pub fn inventory_program() -> Program {
    Program::new()
        .with_type(
            TypeDecl::interface("IInventory")
                .with_shim(marker(ShimKind::Instance, Some("Inventory")))
                .with_member(MemberDecl::method("Items", ty("IEnumerable<IItem>")))
                .with_member(MemberDecl::method("Top", ty("IItem[]")))
                .with_member(
                    MemberDecl::method("Restock", ty("void"))
                        .with_param(ParamDecl::new("items", ty("IEnumerable<IItem>"))),
                ),
        )
        .with_type(TypeDecl::interface("IItem").with_member(MemberDecl::property("Name", ty("string"))))
        .with_type(
            TypeDecl::class("Inventory")
                .with_member(MemberDecl::method("Items", ty("List<Item>")))
                .with_member(MemberDecl::method("Top", ty("Item[]")))
                .with_member(
                    MemberDecl::method("Restock", ty("void"))
                        .with_param(ParamDecl::new("items", ty("Item[]"))),
                ),
        )
        .with_type(TypeDecl::class("Item").with_member(MemberDecl::property("Name", ty("string"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_programs_validate() {
        date_time_program().validate().unwrap();
        inventory_program().validate().unwrap();
    }

    #[test]
    fn test_toml_fixture_matches_builder() {
        let parsed = Program::from_toml_str(DATE_TIME_MODEL).unwrap();
        assert_eq!(parsed, date_time_program());
    }
}

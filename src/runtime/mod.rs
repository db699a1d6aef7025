//! Runtime adapter dispatch.
//!
//! A model of what the generated registry does at run time, driven by the
//! same [`LookupTables`] the renderers emit. Dispatch is an explicit map
//! from interface to runtime type to adapter name; assignable lookups
//! land in a memo held by the registry itself.
//!
//! Lookup order for `adapt(interface, value)`:
//!
//! ```text
//! null                   -> null
//! adapter for interface  -> same adapter
//! other adapter          -> unwrap, then dispatch the instance
//! exact table            -> (interface, runtime type)
//! memo                   -> earlier assignable hit
//! fallback list          -> first underlying type the runtime type is assignable to
//! otherwise              -> AdaptError::NoAdapter
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::index::TypeIndex;
use crate::core::types::TypeRef;
use crate::emit::tables::LookupTables;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// A runtime object of a concrete type. Identity is the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    id: u64,
    ty: TypeRef,
}

impl Instance {
    pub fn new(ty: TypeRef) -> Self {
        Instance {
            id: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            ty,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

/// An adapter object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimHandle {
    pub interface: TypeRef,
    pub adapter: String,
    /// The wrapped instance; `None` for static and factory adapters.
    pub inner: Option<Instance>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Object(Instance),
    Shim(ShimHandle),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_shim(&self) -> Option<&ShimHandle> {
        match self {
            Value::Shim(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Runtime adaptation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum AdaptError {
    #[error("no shim implements `{interface}` for runtime type `{runtime_type}`")]
    #[diagnostic(
        code(shimbind::runtime::no_adapter),
        help("Add a call site adapting `{runtime_type}` to `{interface}` and regenerate")
    )]
    NoAdapter {
        interface: TypeRef,
        runtime_type: String,
    },

    #[error("no shim implements `{interface}` over declared type `{declared}`")]
    #[diagnostic(code(shimbind::runtime::no_factory))]
    NoFactory { interface: TypeRef, declared: TypeRef },
}

/// Interface to runtime type to adapter name, plus the assignable memo.
pub struct AdapterRegistry<'a, 'p> {
    index: &'a TypeIndex<'p>,
    exact: HashMap<TypeRef, HashMap<TypeRef, String>>,
    create: HashMap<(TypeRef, TypeRef), String>,
    fallback: HashMap<TypeRef, Vec<(TypeRef, String)>>,
    memo: HashMap<(TypeRef, TypeRef), String>,
}

impl<'a, 'p> AdapterRegistry<'a, 'p> {
    pub fn new(tables: &LookupTables, index: &'a TypeIndex<'p>) -> Self {
        let mut exact: HashMap<TypeRef, HashMap<TypeRef, String>> = HashMap::new();
        for entry in &tables.adapt {
            exact
                .entry(entry.interface.clone())
                .or_default()
                .insert(entry.ty.clone(), entry.adapter.clone());
        }

        let create = tables
            .create
            .iter()
            .map(|e| ((e.interface.clone(), e.ty.clone()), e.adapter.clone()))
            .collect();

        let fallback = tables
            .fallback
            .iter()
            .map(|(iface, entries)| {
                let entries = entries
                    .iter()
                    .map(|e| (e.ty.clone(), e.adapter.clone()))
                    .collect();
                (iface.clone(), entries)
            })
            .collect();

        AdapterRegistry {
            index,
            exact,
            create,
            fallback,
            memo: HashMap::new(),
        }
    }

    /// Number of memoized assignable lookups.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Adapter name for an interface over a runtime type.
    pub fn lookup(&mut self, interface: &TypeRef, runtime: &TypeRef) -> Result<String, AdaptError> {
        if let Some(adapter) = self.exact.get(interface).and_then(|m| m.get(runtime)) {
            return Ok(adapter.clone());
        }

        let key = (interface.clone(), runtime.clone());
        if let Some(adapter) = self.memo.get(&key) {
            return Ok(adapter.clone());
        }

        let hit = self
            .fallback
            .get(interface)
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|(underlying, _)| self.index.is_assignable(runtime, underlying))
            })
            .map(|(_, adapter)| adapter.clone());

        match hit {
            Some(adapter) => {
                tracing::debug!("memoized {} for {} over {}", adapter, interface, runtime);
                self.memo.insert(key, adapter.clone());
                Ok(adapter)
            }
            None => Err(AdaptError::NoAdapter {
                interface: interface.clone(),
                runtime_type: runtime.to_string(),
            }),
        }
    }

    /// Wrap a value in the adapter for `interface`.
    pub fn adapt(&mut self, interface: &TypeRef, value: Value) -> Result<Value, AdaptError> {
        let instance = match value {
            Value::Null => return Ok(Value::Null),
            Value::Shim(handle) if handle.interface == *interface => return Ok(Value::Shim(handle)),
            Value::Shim(handle) => match handle.inner {
                Some(inner) => inner,
                None => {
                    return Err(AdaptError::NoAdapter {
                        interface: interface.clone(),
                        runtime_type: handle.adapter,
                    })
                }
            },
            Value::Object(instance) => instance,
        };

        let adapter = self.lookup(interface, instance.ty())?;
        Ok(Value::Shim(ShimHandle {
            interface: interface.clone(),
            adapter,
            inner: Some(instance),
        }))
    }

    /// Adapt every element of a sequence.
    pub fn adapt_each(
        &mut self,
        interface: &TypeRef,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Vec<Value>, AdaptError> {
        values
            .into_iter()
            .map(|value| self.adapt(interface, value))
            .collect()
    }

    /// The static or factory adapter for `interface` over `declared`.
    pub fn create(&self, interface: &TypeRef, declared: &TypeRef) -> Result<Value, AdaptError> {
        let key = (interface.clone(), declared.clone());
        match self.create.get(&key) {
            Some(adapter) => Ok(Value::Shim(ShimHandle {
                interface: interface.clone(),
                adapter: adapter.clone(),
                inner: None,
            })),
            None => Err(AdaptError::NoFactory {
                interface: interface.clone(),
                declared: declared.clone(),
            }),
        }
    }
}

/// Accept an adapter or a raw instance and return the underlying value.
pub fn unwrap(value: Value) -> Value {
    match value {
        Value::Shim(ShimHandle {
            inner: Some(inner), ..
        }) => Value::Object(inner),
        other => other,
    }
}

/// Unwrap every element of a sequence.
pub fn unwrap_each(values: impl IntoIterator<Item = Value>) -> Vec<Value> {
    values.into_iter().map(unwrap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::ShimKind;
    use crate::core::program::{CallSite, MemberDecl, Program, TypeDecl};
    use crate::emit::EmitModel;
    use crate::resolver::Session;
    use crate::test_support::{date_time_program, marker, ty};

    fn animals() -> Program {
        Program::new()
            .with_type(
                TypeDecl::interface("INamed")
                    .with_shim(marker(ShimKind::Instance, None))
                    .with_member(MemberDecl::property("Name", ty("string"))),
            )
            .with_type(TypeDecl::class("Animal").with_member(MemberDecl::property("Name", ty("string"))))
            .with_type(TypeDecl::class("Dog").with_base(ty("Animal")))
            .with_type(TypeDecl::class("Puppy").with_base(ty("Dog")))
            .with_type(TypeDecl::class("Rock"))
            .with_call_site(CallSite::new(ty("INamed"), ty("Animal")))
            .with_call_site(CallSite::new(ty("INamed"), ty("Dog")))
    }

    fn tables(program: &Program) -> LookupTables {
        let index = TypeIndex::new(program);
        let resolution = Session::new().resolve(program);
        assert!(resolution.is_ok(), "{:?}", resolution.diagnostics);
        EmitModel::build(&resolution, &index).tables
    }

    #[test]
    fn test_adapt_then_unwrap_is_identity() {
        let program = date_time_program();
        let index = TypeIndex::new(&program);
        let tables = tables(&program);
        let mut registry = AdapterRegistry::new(&tables, &index);

        let now = Instance::new(ty("System.DateTime"));
        let adapted = registry
            .adapt(&ty("IDateTime"), Value::Object(now.clone()))
            .unwrap();
        assert_eq!(adapted.as_shim().unwrap().adapter, "IDateTime__System_DateTime");
        assert_eq!(unwrap(adapted), Value::Object(now.clone()));
        assert_eq!(unwrap(Value::Object(now.clone())), Value::Object(now));
    }

    #[test]
    fn test_null_stays_null() {
        let program = date_time_program();
        let index = TypeIndex::new(&program);
        let tables = tables(&program);
        let mut registry = AdapterRegistry::new(&tables, &index);

        assert!(registry.adapt(&ty("IDateTime"), Value::Null).unwrap().is_null());
        assert!(unwrap(Value::Null).is_null());
    }

    #[test]
    fn test_already_adapted_value_is_returned_as_is() {
        let program = date_time_program();
        let index = TypeIndex::new(&program);
        let tables = tables(&program);
        let mut registry = AdapterRegistry::new(&tables, &index);

        let once = registry
            .adapt(&ty("IDateTime"), Value::Object(Instance::new(ty("System.DateTime"))))
            .unwrap();
        let twice = registry.adapt(&ty("IDateTime"), once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sequences_adapt_each_element() {
        let program = date_time_program();
        let index = TypeIndex::new(&program);
        let tables = tables(&program);
        let mut registry = AdapterRegistry::new(&tables, &index);

        let spans = vec![
            Value::Object(Instance::new(ty("System.TimeSpan"))),
            Value::Null,
            Value::Object(Instance::new(ty("System.TimeSpan"))),
        ];
        let adapted = registry.adapt_each(&ty("ITimeSpan"), spans.clone()).unwrap();
        assert_eq!(adapted.len(), 3);
        assert!(adapted[1].is_null());
        assert_eq!(unwrap_each(adapted), spans);
    }

    #[test]
    fn test_fallback_picks_most_derived_and_memoizes() {
        let program = animals();
        let index = TypeIndex::new(&program);
        let tables = tables(&program);
        let mut registry = AdapterRegistry::new(&tables, &index);

        let adapted = registry
            .adapt(&ty("INamed"), Value::Object(Instance::new(ty("Puppy"))))
            .unwrap();
        assert_eq!(adapted.as_shim().unwrap().adapter, "INamed__Dog");
        assert_eq!(registry.memo_len(), 1);

        registry
            .adapt(&ty("INamed"), Value::Object(Instance::new(ty("Puppy"))))
            .unwrap();
        assert_eq!(registry.memo_len(), 1);

        registry
            .adapt(&ty("INamed"), Value::Object(Instance::new(ty("Dog"))))
            .unwrap();
        assert_eq!(registry.memo_len(), 1);
    }

    #[test]
    fn test_missing_adapter_names_both_types() {
        let program = animals();
        let index = TypeIndex::new(&program);
        let tables = tables(&program);
        let mut registry = AdapterRegistry::new(&tables, &index);

        let err = registry
            .adapt(&ty("INamed"), Value::Object(Instance::new(ty("Rock"))))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("INamed"));
        assert!(message.contains("Rock"));
    }

    #[test]
    fn test_create_uses_declared_type() {
        let program = date_time_program();
        let index = TypeIndex::new(&program);
        let tables = tables(&program);
        let registry = AdapterRegistry::new(&tables, &index);

        let factory = registry
            .create(&ty("IDateTimeFactory"), &ty("System.DateTime"))
            .unwrap();
        assert_eq!(
            factory.as_shim().unwrap().adapter,
            "IDateTimeFactory__System_DateTime_Factory"
        );
        assert!(matches!(
            registry.create(&ty("IDateTimeFactory"), &ty("System.TimeSpan")),
            Err(AdaptError::NoFactory { .. })
        ));
    }
}

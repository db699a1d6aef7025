//! The program model.
//!
//! A program model stands in for the host compiler's view of the input
//! program: every type declaration with its members, the shim markers
//! attached to interfaces and their members, and every adaptation call
//! site. Models are written as TOML or JSON; a directory of model files is
//! merged in path order.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::definition::ShimKind;
use crate::core::types::TypeRef;
use crate::util::fs::{collect_model_files, read_to_string};

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Interface,
    Class,
    Struct,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeKind::Interface => write!(f, "interface"),
            TypeKind::Class => write!(f, "class"),
            TypeKind::Struct => write!(f, "struct"),
        }
    }
}

/// Interface-level shim marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimMarker {
    #[serde(default)]
    pub kind: ShimKind,

    /// Default concrete type the interface adapts onto.
    #[serde(default)]
    pub target: Option<TypeRef>,

    /// Tolerate interface members without a matching target member.
    #[serde(default)]
    pub ignore_missing_members: bool,
}

/// Member-level override marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberOverride {
    /// Bind to a differently named target member.
    pub target_name: Option<String>,

    /// Bind against a different type than the interface default.
    pub target_type: Option<TypeRef>,

    /// Route the call through a static forwarder declared on this type.
    pub proxy: Option<TypeRef>,

    /// The member constructs a new target instance.
    pub constructor: bool,
}

/// Kind of a declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
    Event,
    Field,
    Constructor,
}

impl MemberKind {
    pub fn is_callable(self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Constructor)
    }
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Event => "event",
            MemberKind::Field => "field",
            MemberKind::Constructor => "constructor",
        };
        write!(f, "{}", s)
    }
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Default value text, if the parameter is optional.
    #[serde(default)]
    pub default: Option<String>,

    /// Unwrap an adapted argument to this type before delegating.
    #[serde(default)]
    pub unwrap_to: Option<TypeRef>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        ParamDecl {
            name: name.into(),
            ty,
            default: None,
            unwrap_to: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_unwrap_to(mut self, ty: TypeRef) -> Self {
        self.unwrap_to = Some(ty);
        self
    }
}

fn default_true() -> bool {
    true
}

/// A declared member of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub kind: MemberKind,

    /// Member name (ignored for constructors).
    #[serde(default)]
    pub name: String,

    /// Property, field or event type.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeRef>,

    /// Method return type (`void` when absent).
    #[serde(default)]
    pub returns: Option<TypeRef>,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    #[serde(default, rename = "static")]
    pub is_static: bool,

    /// Property has a getter.
    #[serde(default = "default_true")]
    pub get: bool,

    /// Property has a setter.
    #[serde(default)]
    pub set: bool,

    /// Property has an init-only setter.
    #[serde(default)]
    pub init: bool,

    /// Field is read-only.
    #[serde(default)]
    pub readonly: bool,

    /// Explicit implementation of this interface's member; only reachable
    /// through a cast to it.
    #[serde(default)]
    pub via: Option<TypeRef>,

    #[serde(default)]
    pub shim: Option<MemberOverride>,
}

impl MemberDecl {
    fn new(kind: MemberKind, name: impl Into<String>) -> Self {
        MemberDecl {
            kind,
            name: name.into(),
            ty: None,
            returns: None,
            params: Vec::new(),
            is_static: false,
            get: true,
            set: false,
            init: false,
            readonly: false,
            via: None,
            shim: None,
        }
    }

    /// A method returning `returns`.
    pub fn method(name: impl Into<String>, returns: TypeRef) -> Self {
        let mut member = MemberDecl::new(MemberKind::Method, name);
        member.returns = Some(returns);
        member
    }

    /// A get-only property.
    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut member = MemberDecl::new(MemberKind::Property, name);
        member.ty = Some(ty);
        member
    }

    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut member = MemberDecl::new(MemberKind::Field, name);
        member.ty = Some(ty);
        member
    }

    pub fn event(name: impl Into<String>, handler: TypeRef) -> Self {
        let mut member = MemberDecl::new(MemberKind::Event, name);
        member.ty = Some(handler);
        member
    }

    pub fn constructor() -> Self {
        MemberDecl::new(MemberKind::Constructor, "")
    }

    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_setter(mut self) -> Self {
        self.set = true;
        self
    }

    pub fn with_init(mut self) -> Self {
        self.init = true;
        self
    }

    pub fn without_getter(mut self) -> Self {
        self.get = false;
        self
    }

    pub fn with_readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn with_via(mut self, via: TypeRef) -> Self {
        self.via = Some(via);
        self
    }

    pub fn with_override(mut self, shim: MemberOverride) -> Self {
        self.shim = Some(shim);
        self
    }

    /// Return type of a method, `void` when unspecified.
    pub fn return_type(&self) -> TypeRef {
        self.returns.clone().unwrap_or_else(TypeRef::void)
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Type name; generic arguments name the type's parameters.
    pub name: TypeRef,

    pub kind: TypeKind,

    #[serde(default)]
    pub base: Option<TypeRef>,

    #[serde(default)]
    pub interfaces: Vec<TypeRef>,

    #[serde(default)]
    pub members: Vec<MemberDecl>,

    #[serde(default)]
    pub shim: Option<ShimMarker>,
}

impl TypeDecl {
    pub fn new(name: TypeRef, kind: TypeKind) -> Self {
        TypeDecl {
            name,
            kind,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            shim: None,
        }
    }

    pub fn interface(name: &str) -> Self {
        TypeDecl::new(TypeRef::named(name), TypeKind::Interface)
    }

    pub fn class(name: &str) -> Self {
        TypeDecl::new(TypeRef::named(name), TypeKind::Class)
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_interface(mut self, iface: TypeRef) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn with_shim(mut self, marker: ShimMarker) -> Self {
        self.shim = Some(marker);
        self
    }

    /// Names of the type's generic parameters.
    pub fn generic_params(&self) -> Vec<String> {
        self.name
            .args()
            .iter()
            .filter_map(|a| a.name().map(str::to_string))
            .collect()
    }
}

/// One adaptation call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Interface the value is adapted to.
    pub interface: TypeRef,

    /// Static type of the adapted argument (instance shims).
    #[serde(default)]
    pub argument_type: Option<TypeRef>,

    /// Source location, for diagnostics.
    #[serde(default)]
    pub location: Option<String>,
}

impl CallSite {
    pub fn new(interface: TypeRef, argument_type: TypeRef) -> Self {
        CallSite {
            interface,
            argument_type: Some(argument_type),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// The complete input program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Program {
    pub types: Vec<TypeDecl>,
    pub call_sites: Vec<CallSite>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn with_call_site(mut self, site: CallSite) -> Self {
        self.call_sites.push(site);
        self
    }

    /// Parse a TOML model.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let program: Program = toml::from_str(contents).context("failed to parse TOML model")?;
        program.validate()?;
        Ok(program)
    }

    /// Parse a JSON model.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let program: Program =
            serde_json::from_str(contents).context("failed to parse JSON model")?;
        program.validate()?;
        Ok(program)
    }

    /// Load a model file, or every model file below a directory.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            let files = collect_model_files(path)?;
            if files.is_empty() {
                bail!("no model files (*.toml, *.json) found in {}", path.display());
            }
            let mut program = Program::new();
            for file in files {
                program.merge(Program::load_file(&file)?);
            }
            program.validate()?;
            return Ok(program);
        }
        Program::load_file(path)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Program::from_json_str(&contents),
            _ => Program::from_toml_str(&contents),
        };
        parsed.with_context(|| format!("invalid model file: {}", path.display()))
    }

    /// Append another model's declarations and call sites.
    pub fn merge(&mut self, other: Program) {
        self.types.extend(other.types);
        self.call_sites.extend(other.call_sites);
    }

    /// Structural checks that do not need name resolution.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for decl in &self.types {
            let Some(name) = decl.name.name() else {
                bail!("type declaration `{}` must be a named type", decl.name);
            };
            if !seen.insert(name) {
                bail!("type `{}` is declared more than once", name);
            }
            for member in &decl.members {
                if member.kind != MemberKind::Constructor && member.name.is_empty() {
                    bail!("type `{}` has a {} without a name", decl.name, member.kind);
                }
                let needs_type = matches!(
                    member.kind,
                    MemberKind::Property | MemberKind::Field | MemberKind::Event
                );
                if needs_type && member.ty.is_none() {
                    bail!(
                        "{} `{}.{}` is missing its `type`",
                        member.kind,
                        decl.name,
                        member.name
                    );
                }
            }
        }
        Ok(())
    }
}

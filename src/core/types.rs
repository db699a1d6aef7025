//! Type references.
//!
//! A `TypeRef` names a type the way a declaration or signature spells it:
//! `Name`, `Ns.Name`, `Name<A, B>`, `T[]` or `T?`. Model files carry type
//! references as strings; they are parsed once on load and compared
//! structurally afterwards.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::hash::Fingerprint;

/// Generic sequence types whose single type argument is the element type.
const SEQUENCE_TYPES: &[&str] = &[
    "IEnumerable",
    "ICollection",
    "IList",
    "IReadOnlyCollection",
    "IReadOnlyList",
    "List",
];

/// How a receiving side holds an element-wise adapted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceShape {
    /// Any `IEnumerable<T>`; the adapted sequence is passed as is.
    Lazy,
    /// A list or collection interface; materialized as a `List<T>`.
    List,
    /// A `T[]`.
    Array,
}

/// Names that denote the root object type.
const OBJECT_TYPES: &[&str] = &["object", "System.Object"];

/// Error parsing a type reference string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type reference `{input}`: {reason}")]
pub struct TypeRefParseError {
    pub input: String,
    pub reason: String,
}

/// A reference to a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A named type, possibly with generic arguments.
    Named { name: String, args: Vec<TypeRef> },
    /// A single-dimension array of the element type.
    Array(Box<TypeRef>),
    /// A nullable wrapper around the inner type.
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    /// A non-generic named type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic named type.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// An array of `element`.
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// The `void` pseudo-type used for methods without a return value.
    pub fn void() -> Self {
        TypeRef::named("void")
    }

    /// Parse a type reference.
    pub fn parse(input: &str) -> Result<Self, TypeRefParseError> {
        let mut parser = Parser {
            input,
            chars: input.char_indices().peekable(),
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if let Some((pos, c)) = parser.chars.next() {
            return Err(parser.error(format!("unexpected `{}` at offset {}", c, pos)));
        }
        Ok(ty)
    }

    /// The type name, for named types.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Generic arguments of a named type (empty otherwise).
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// The name without its namespace qualifier.
    pub fn simple_name(&self) -> Option<&str> {
        self.name().map(|n| n.rsplit('.').next().unwrap_or(n))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Named { name, args } if args.is_empty() && name == "void")
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeRef::Named { name, args } if args.is_empty() && OBJECT_TYPES.contains(&name.as_str()))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    /// The element type if this is an array or a known generic sequence.
    pub fn sequence_element(&self) -> Option<&TypeRef> {
        self.sequence().map(|(element, _)| element)
    }

    /// The element type and holding shape of an array or known generic
    /// sequence.
    pub fn sequence(&self) -> Option<(&TypeRef, SequenceShape)> {
        match self {
            TypeRef::Array(element) => Some((element, SequenceShape::Array)),
            TypeRef::Named { args, .. } if args.len() == 1 => {
                let simple = self.simple_name()?;
                if !SEQUENCE_TYPES.contains(&simple) {
                    return None;
                }
                let shape = if simple == "IEnumerable" {
                    SequenceShape::Lazy
                } else {
                    SequenceShape::List
                };
                Some((&args[0], shape))
            }
            _ => None,
        }
    }

    /// Replace generic parameter names according to `subst`.
    pub fn substitute(&self, subst: &HashMap<String, TypeRef>) -> TypeRef {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Named { name, args } if args.is_empty() => {
                subst.get(name).cloned().unwrap_or_else(|| self.clone())
            }
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(subst)).collect(),
            },
            TypeRef::Array(element) => TypeRef::array(element.substitute(subst)),
            TypeRef::Nullable(inner) => TypeRef::Nullable(Box::new(inner.substitute(subst))),
        }
    }

    /// An identifier-safe rendering, used to derive generated type names.
    ///
    /// Plain dotted names map dots to `_`. Any other spelling loses
    /// information when flattened, so it carries a short hash of the full
    /// type to keep distinct types apart.
    pub fn ident(&self) -> String {
        let full = self.to_string();
        if full.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
            return full.replace('.', "_");
        }

        let mut out = String::new();
        for c in full.chars() {
            match c {
                c if c.is_ascii_alphanumeric() => out.push(c),
                '[' => out.push_str("Array"),
                '?' => out.push_str("Nullable"),
                ' ' | ']' => {}
                _ => out.push('_'),
            }
        }
        let mut fp = Fingerprint::new();
        fp.update_str(&full);
        let hash = fp.finish();
        format!("{}_{}", out.trim_end_matches('_'), &hash[..8])
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Array(element) => write!(f, "{}[]", element),
            TypeRef::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> TypeRefParseError {
        TypeRefParseError {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if matches!(self.chars.peek(), Some((_, c)) if *c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeRefParseError> {
        self.skip_ws();
        let name = self.parse_name()?;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected `,` or `>` in generic argument list"));
            }
        }

        let mut ty = TypeRef::Named { name, args };
        loop {
            if self.eat('[') {
                if !self.eat(']') {
                    return Err(self.error("expected `]` after `[`"));
                }
                ty = TypeRef::array(ty);
            } else if self.eat('?') {
                ty = TypeRef::Nullable(Box::new(ty));
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_name(&mut self) -> Result<String, TypeRefParseError> {
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() || name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return Err(self.error("expected a type name"));
        }
        Ok(name)
    }
}

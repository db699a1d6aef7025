//! C# renderer.
//!
//! Emits one sealed adapter class per pair plus a `ShimRegistry` holding
//! the lookup tables:
//!
//! ```text
//! ShimRegistry.Shim<T>(instance)      adapt; null stays null
//! ShimRegistry.ShimEach<T>(items)     adapt element by element
//! ShimRegistry.Unshim(value)          adapter or raw instance -> instance
//! ShimRegistry.Create<T>(declared)    static and factory adapters
//! ```
//!
//! Runtime adapter selection tries the exact table, then the memo, then
//! the fallback list; a miss throws `InvalidCastException` naming both
//! types.

use std::fmt::{self, Write as _};

use crate::core::binding::{ArgAdaptation, Resolved, ReturnAdaptation};
use crate::core::member::{ShimMember, ShimMemberKind, ShimParam};
use crate::core::target::Callee;
use crate::core::types::{SequenceShape, TypeRef};
use crate::emit::{EmitError, EmitModel, EmitOptions, GeneratedUnit, Renderer, RendererKind};
use crate::emit::tables::LookupTables;
use crate::resolver::{MemberBinding, ResolvedPair};

/// Name of the combined unit.
pub const COMBINED_UNIT: &str = "Shims.g.cs";

/// Name of the registry unit when adapters get their own files.
pub const REGISTRY_UNIT: &str = "ShimRegistry.g.cs";

const KEYWORDS: &[&str] = &[
    "base", "bool", "byte", "char", "checked", "class", "decimal", "default", "delegate",
    "double", "event", "explicit", "extern", "fixed", "float", "implicit", "in", "int",
    "interface", "internal", "lock", "long", "namespace", "new", "object", "operator", "out",
    "override", "params", "private", "protected", "public", "readonly", "ref", "sbyte",
    "sealed", "short", "sizeof", "stackalloc", "static", "string", "struct", "this", "throw",
    "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual", "void",
    "volatile",
];

fn ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Indenting line writer.
struct CodeWriter {
    out: String,
    indent: usize,
}

impl CodeWriter {
    fn new() -> Self {
        CodeWriter {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) -> fmt::Result {
        if text.is_empty() {
            writeln!(self.out)
        } else {
            writeln!(self.out, "{:width$}{}", "", text, width = self.indent * 4)
        }
    }

    fn open(&mut self, text: &str) -> fmt::Result {
        self.line(text)?;
        self.line("{")?;
        self.indent += 1;
        Ok(())
    }

    fn close(&mut self) -> fmt::Result {
        self.indent = self.indent.saturating_sub(1);
        self.line("}")
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Renders C# source.
#[derive(Debug, Default)]
pub struct CSharpRenderer;

impl CSharpRenderer {
    pub fn new() -> Self {
        CSharpRenderer
    }

    fn unit(
        &self,
        path: &str,
        namespace: &str,
        body: impl FnOnce(&mut CodeWriter) -> fmt::Result,
    ) -> Result<GeneratedUnit, EmitError> {
        let mut w = CodeWriter::new();
        let rendered = write_header(&mut w)
            .and_then(|_| w.open(&format!("namespace {}", namespace)))
            .and_then(|_| body(&mut w))
            .and_then(|_| w.close());
        rendered.map_err(|source| EmitError::Render {
            unit: path.to_string(),
            source,
        })?;
        Ok(GeneratedUnit::new(path, w.finish()))
    }
}

impl Renderer for CSharpRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::CSharp
    }

    fn render(&self, model: &EmitModel<'_>, options: &EmitOptions) -> Result<Vec<GeneratedUnit>, EmitError> {
        let namespace = &options.namespace;

        if !options.file_per_adapter {
            let unit = self.unit(COMBINED_UNIT, namespace, |w| {
                for pair in &model.adapters {
                    render_adapter(w, pair)?;
                    w.line("")?;
                }
                render_registry(w, &model.tables)
            })?;
            return Ok(vec![unit]);
        }

        let mut units = Vec::with_capacity(model.adapters.len() + 1);
        for pair in &model.adapters {
            let path = format!("{}.g.cs", pair.adapter_name());
            units.push(self.unit(&path, namespace, |w| render_adapter(w, pair))?);
        }
        units.push(self.unit(REGISTRY_UNIT, namespace, |w| {
            render_registry(w, &model.tables)
        })?);
        Ok(units)
    }
}

fn write_header(w: &mut CodeWriter) -> fmt::Result {
    w.line("// <auto-generated>")?;
    w.line("//     Generated by shimbind. Do not edit.")?;
    w.line("// </auto-generated>")?;
    w.line("#nullable disable")?;
    w.line("using System;")?;
    w.line("using System.Collections.Concurrent;")?;
    w.line("using System.Collections.Generic;")?;
    w.line("using System.Linq;")?;
    w.line("")
}

fn render_adapter(w: &mut CodeWriter, pair: &ResolvedPair) -> fmt::Result {
    let name = pair.adapter_name();
    let target = &pair.target;

    w.line(&format!("// {}", target))?;
    if target.holds_instance() {
        w.open(&format!(
            "internal sealed class {} : {}, IShimAdapter",
            name, target.interface
        ))?;
        w.line(&format!("private readonly {} _inner;", target.ty))?;
        w.line("")?;
        w.line(&format!("public {}({} inner) => _inner = inner;", name, target.ty))?;
        w.line("")?;
        w.line("public object Unwrap() => _inner;")?;
    } else {
        w.open(&format!("internal sealed class {} : {}", name, target.interface))?;
    }

    for (i, member) in pair.members.iter().enumerate() {
        if i > 0 || target.holds_instance() {
            w.line("")?;
        }
        render_member(w, pair, member)?;
    }

    w.close()
}

fn not_implemented(pair: &ResolvedPair, member: &ShimMember) -> String {
    format!(
        "throw new NotImplementedException(\"{}.{} has no counterpart on {}\")",
        pair.target.interface, member.name, pair.target.ty
    )
}

/// The expression a non-constructor member is reached through.
fn receiver(callee: &Callee) -> String {
    match callee {
        Callee::Instance => "_inner".to_string(),
        Callee::Narrowed(iface) => format!("(({})_inner)", iface),
        Callee::Static(ty) | Callee::Constructor(ty) | Callee::Forwarder(ty) => ty.to_string(),
    }
}

/// Materialize an element-wise adapted sequence in the receiving shape.
fn collect(each: String, shape: SequenceShape) -> String {
    match shape {
        SequenceShape::Lazy => each,
        SequenceShape::List => format!("{}.ToList()", each),
        SequenceShape::Array => format!("{}.ToArray()", each),
    }
}

fn unwrap_arg(expr: &str, adaptation: Option<&ArgAdaptation>) -> String {
    match adaptation {
        None => expr.to_string(),
        Some(a) if a.each => collect(
            format!("ShimRegistry.UnshimEach<{}>({})", a.underlying, expr),
            a.collect,
        ),
        Some(a) => format!("({})ShimRegistry.Unshim({})", a.underlying, expr),
    }
}

fn wrap_return(expr: String, adaptation: Option<&ReturnAdaptation>) -> String {
    match adaptation {
        None => expr,
        Some(ReturnAdaptation::Wrap { interface, .. }) => {
            format!("ShimRegistry.Shim<{}>({})", interface, expr)
        }
        Some(ReturnAdaptation::WrapEach {
            interface, collect: shape, ..
        }) => collect(
            format!("ShimRegistry.ShimEach<{}>({})", interface, expr),
            *shape,
        ),
    }
}

fn invocation(resolved: &Resolved, params: &[ShimParam]) -> String {
    let mut args: Vec<String> = params
        .iter()
        .enumerate()
        .map(|(i, p)| unwrap_arg(&ident(&p.name), resolved.arg_at(i)))
        .collect();
    let name = &resolved.member.name;

    match &resolved.callee {
        Callee::Constructor(ty) => format!("new {}({})", ty, args.join(", ")),
        Callee::Forwarder(ty) => {
            args.insert(0, "_inner".to_string());
            format!("{}.{}({})", ty, name, args.join(", "))
        }
        callee => format!("{}.{}({})", receiver(callee), name, args.join(", ")),
    }
}

fn render_member(w: &mut CodeWriter, pair: &ResolvedPair, mb: &MemberBinding) -> fmt::Result {
    let member = &mb.member;
    let resolved = mb.binding.resolved();

    match &member.kind {
        ShimMemberKind::Method { params, returns } => {
            let decl: Vec<String> = params
                .iter()
                .map(|p| format!("{} {}", p.ty, ident(&p.name)))
                .collect();
            let body = match resolved {
                Some(r) => wrap_return(invocation(r, params), r.ret.as_ref()),
                None => not_implemented(pair, member),
            };
            w.line(&format!(
                "public {} {}({}) => {};",
                returns,
                member.name,
                decl.join(", "),
                body
            ))
        }

        ShimMemberKind::Property { ty, get, set, init } => {
            let access = resolved.map(|r| format!("{}.{}", receiver(&r.callee), r.member.name));
            let getter = match (resolved, &access) {
                (Some(r), Some(access)) => wrap_return(access.clone(), r.ret.as_ref()),
                _ => not_implemented(pair, member),
            };
            let setter = match (resolved, &access) {
                (Some(r), Some(access)) => format!("{} = {}", access, unwrap_arg("value", r.arg_at(0))),
                _ => not_implemented(pair, member),
            };

            if *get && !*set && !*init {
                return w.line(&format!("public {} {} => {};", ty, member.name, getter));
            }
            w.open(&format!("public {} {}", ty, member.name))?;
            if *get {
                w.line(&format!("get => {};", getter))?;
            }
            if *set {
                w.line(&format!("set => {};", setter))?;
            } else if *init {
                w.line(&format!("init => {};", setter))?;
            }
            w.close()
        }

        ShimMemberKind::Event { handler } => {
            w.open(&format!("public event {} {}", handler, member.name))?;
            match resolved {
                Some(r) => {
                    let access = format!("{}.{}", receiver(&r.callee), r.member.name);
                    w.line(&format!("add => {} += value;", access))?;
                    w.line(&format!("remove => {} -= value;", access))?;
                }
                None => {
                    let throw = not_implemented(pair, member);
                    w.line(&format!("add => {};", throw))?;
                    w.line(&format!("remove => {};", throw))?;
                }
            }
            w.close()
        }
    }
}

fn adapt_factory(ty: &TypeRef, adapter: &str) -> String {
    format!("inner => new {}(({})inner)", adapter, ty)
}

fn render_registry(w: &mut CodeWriter, tables: &LookupTables) -> fmt::Result {
    w.open("public interface IShimAdapter")?;
    w.line("object Unwrap();")?;
    w.close()?;
    w.line("")?;

    w.open("public static class ShimRegistry")?;

    w.line("private static readonly Dictionary<(Type Interface, Type Runtime), Func<object, object>> AdaptTable = new()")?;
    w.line("{")?;
    w.indent += 1;
    for entry in &tables.adapt {
        w.line(&format!(
            "[(typeof({}), typeof({}))] = {},",
            entry.interface,
            entry.ty,
            adapt_factory(&entry.ty, &entry.adapter)
        ))?;
    }
    w.indent -= 1;
    w.line("};")?;
    w.line("")?;

    w.line("private static readonly Dictionary<(Type Interface, Type Declared), Func<object>> CreateTable = new()")?;
    w.line("{")?;
    w.indent += 1;
    for entry in &tables.create {
        w.line(&format!(
            "[(typeof({}), typeof({}))] = () => new {}(),",
            entry.interface, entry.ty, entry.adapter
        ))?;
    }
    w.indent -= 1;
    w.line("};")?;
    w.line("")?;

    w.line("private static readonly (Type Interface, Type Underlying, Func<object, object> Adapt)[] Fallback =")?;
    w.line("{")?;
    w.indent += 1;
    for entry in tables.fallback.values().flatten() {
        w.line(&format!(
            "(typeof({}), typeof({}), {}),",
            entry.interface,
            entry.ty,
            adapt_factory(&entry.ty, &entry.adapter)
        ))?;
    }
    w.indent -= 1;
    w.line("};")?;
    w.line("")?;

    w.line("private static readonly ConcurrentDictionary<(Type Interface, Type Runtime), Func<object, object>> Memo = new();")?;
    w.line("")?;

    w.open("public static T Shim<T>(object instance) where T : class")?;
    w.line("if (instance is null) return null;")?;
    w.open("if (instance is IShimAdapter adapter)")?;
    w.line("if (instance is T already) return already;")?;
    w.line("instance = adapter.Unwrap();")?;
    w.close()?;
    w.line("return (T)Resolve(typeof(T), instance.GetType())(instance);")?;
    w.close()?;
    w.line("")?;

    w.open("public static IEnumerable<T> ShimEach<T>(System.Collections.IEnumerable items) where T : class")?;
    w.line("if (items is null) return null;")?;
    w.line("return items.Cast<object>().Select(item => Shim<T>(item));")?;
    w.close()?;
    w.line("")?;

    w.line("public static object Unshim(object value) => value is IShimAdapter adapter ? adapter.Unwrap() : value;")?;
    w.line("")?;

    w.open("public static IEnumerable<U> UnshimEach<U>(System.Collections.IEnumerable items)")?;
    w.line("if (items is null) return null;")?;
    w.line("return items.Cast<object>().Select(item => (U)Unshim(item));")?;
    w.close()?;
    w.line("")?;

    w.open("public static T Create<T>(Type declared) where T : class")?;
    w.line("if (CreateTable.TryGetValue((typeof(T), declared), out var create)) return (T)create();")?;
    w.line("throw new InvalidCastException($\"No shim implements {typeof(T)} over {declared}\");")?;
    w.close()?;
    w.line("")?;

    w.open("private static Func<object, object> Resolve(Type iface, Type runtime)")?;
    w.line("if (AdaptTable.TryGetValue((iface, runtime), out var exact)) return exact;")?;
    w.line("if (Memo.TryGetValue((iface, runtime), out var memo)) return memo;")?;
    w.open("foreach (var entry in Fallback)")?;
    w.open("if (entry.Interface == iface && entry.Underlying.IsAssignableFrom(runtime))")?;
    w.line("Memo[(iface, runtime)] = entry.Adapt;")?;
    w.line("return entry.Adapt;")?;
    w.close()?;
    w.close()?;
    w.line("throw new InvalidCastException($\"No shim implements {iface} for runtime type {runtime}\");")?;
    w.close()?;

    w.close()
}

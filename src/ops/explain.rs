//! Implementation of `shimbind explain`.

use std::fmt::Write as _;

use anyhow::{bail, Result};

use crate::core::binding::{Binding, ReturnAdaptation};
use crate::core::types::TypeRef;
use crate::ops::resolve::ModelResolution;
use crate::resolver::{ResolvedPair, TargetOrigin};
use crate::util::diagnostic::suggestions;

fn origin_label(origin: &TargetOrigin) -> String {
    match origin {
        TargetOrigin::Declared => "declared by the shim marker".to_string(),
        TargetOrigin::CallSite { location: Some(at) } => format!("call site at {}", at),
        TargetOrigin::CallSite { location: None } => "call site".to_string(),
        TargetOrigin::Nested { parent } => format!("nested in {}", parent),
    }
}

fn write_pair(output: &mut String, pair: &ResolvedPair) {
    let _ = writeln!(output, "{}", pair.target);
    let _ = writeln!(output, "  origin: {}", origin_label(&pair.origin));
    if pair.is_emittable() {
        let _ = writeln!(output, "  adapter: {}", pair.adapter_name());
    } else {
        let _ = writeln!(output, "  adapter: (not generated, no member binds)");
    }

    for mb in &pair.members {
        let _ = writeln!(output, "  {}", mb.member.signature());
        let Some(resolved) = mb.binding.resolved() else {
            let _ = writeln!(output, "    -> unbound");
            continue;
        };
        let _ = writeln!(
            output,
            "    -> {}: {}",
            mb.binding.kind_name(),
            resolved.member.signature()
        );
        if let Binding::Proxy(_) = mb.binding {
            let _ = writeln!(output, "       through {}", resolved.callee);
        }
        if resolved.omitted_defaults > 0 {
            let _ = writeln!(
                output,
                "       {} trailing default(s) omitted",
                resolved.omitted_defaults
            );
        }
        for arg in &resolved.args {
            let each = if arg.each { " each" } else { "" };
            let _ = writeln!(
                output,
                "       arg {}: unwrap{} {} to {}",
                arg.position, each, arg.interface, arg.underlying
            );
        }
        match &resolved.ret {
            Some(ReturnAdaptation::Wrap {
                interface,
                underlying,
            }) => {
                let _ = writeln!(output, "       returns: wrap {} as {}", underlying, interface);
            }
            Some(ReturnAdaptation::WrapEach {
                interface,
                underlying,
                ..
            }) => {
                let _ = writeln!(
                    output,
                    "       returns: wrap each {} as {}",
                    underlying, interface
                );
            }
            None => {}
        }
    }
}

/// Describe every pair of one interface: where it came from and how each
/// member binds.
pub fn explain(model: &ModelResolution, interface: &TypeRef) -> Result<String> {
    let Some(definition) = model.session.definition(interface) else {
        let known: Vec<_> = model
            .session
            .definitions()
            .map(|d| d.interface.to_string())
            .collect();
        bail!(
            "no shim definition for `{}`\n\
             known shims: {}\n\
             {}",
            interface,
            if known.is_empty() {
                "(none)".to_string()
            } else {
                known.join(", ")
            },
            suggestions::UNKNOWN_INTERFACE
        );
    };

    let mut output = String::new();
    let registered = if definition.registered {
        "marked"
    } else {
        "implicit"
    };
    let _ = writeln!(
        output,
        "{} ({} shim, {})",
        definition.interface, definition.kind, registered
    );
    if let Some(target) = &definition.declared_target {
        let _ = writeln!(output, "  declared target: {}", target);
    }
    if definition.options.ignore_missing_members {
        let _ = writeln!(output, "  missing members tolerated");
    }

    let mut any = false;
    for pair in model.resolution.pairs_for(interface) {
        let _ = writeln!(output);
        write_pair(&mut output, pair);
        any = true;
    }
    if !any {
        let _ = writeln!(output, "\n  (no targets)");
    }

    Ok(output)
}

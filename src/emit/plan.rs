//! JSON binding plan renderer.
//!
//! Writes the resolved model as `shim-plan.json` for tooling that wants
//! the bindings without parsing generated source.

use serde::Serialize;

use crate::emit::tables::LookupTables;
use crate::emit::{EmitError, EmitModel, EmitOptions, GeneratedUnit, Renderer, RendererKind};
use crate::resolver::ResolvedPair;

pub const PLAN_UNIT: &str = "shim-plan.json";

/// Plan format version, bumped on incompatible layout changes.
pub const PLAN_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct Plan<'a> {
    version: u32,
    namespace: &'a str,
    adapters: Vec<PlanAdapter<'a>>,
    tables: &'a LookupTables,
}

#[derive(Debug, Serialize)]
struct PlanAdapter<'a> {
    name: String,
    #[serde(flatten)]
    pair: &'a ResolvedPair,
}

#[derive(Debug, Default)]
pub struct PlanRenderer;

impl PlanRenderer {
    pub fn new() -> Self {
        PlanRenderer
    }
}

impl Renderer for PlanRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Plan
    }

    fn render(&self, model: &EmitModel<'_>, options: &EmitOptions) -> Result<Vec<GeneratedUnit>, EmitError> {
        let plan = Plan {
            version: PLAN_VERSION,
            namespace: &options.namespace,
            adapters: model
                .adapters
                .iter()
                .map(|pair| PlanAdapter {
                    name: pair.adapter_name(),
                    pair,
                })
                .collect(),
            tables: &model.tables,
        };
        let mut json = serde_json::to_string_pretty(&plan)?;
        json.push('\n');
        Ok(vec![GeneratedUnit::new(PLAN_UNIT, json)])
    }
}

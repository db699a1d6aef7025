//! High-level operations.
//!
//! This module contains the implementation of shimbind commands.

pub mod check;
pub mod explain;
pub mod resolve;
pub mod shimbind_generate;

pub use check::{check, CheckSummary};
pub use explain::explain;
pub use resolve::{load_model, resolve_model, ModelResolution, ResolveOptions};
pub use shimbind_generate::{generate, GenerateOptions, GenerateResult};

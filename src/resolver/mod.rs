//! Shim resolution.
//!
//! Resolution runs in four phases inside a [`Session`]:
//! discovery (parallel classification of declarations and call sites),
//! graph construction (transitive closure over nested adaptations),
//! per-member matching, and diagnostic aggregation. The result of a pass
//! is a [`Resolution`]; the emitter only ever reads it.

pub mod discovery;
pub mod errors;
pub mod graph;
pub mod session;

pub use errors::{Diagnostics, ResolveError};
pub use graph::ShimGraph;
pub use session::{MemberBinding, Resolution, ResolvedPair, Session, TargetOrigin};

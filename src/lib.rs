//! shimbind - declarative interface shims over types you do not control
//!
//! This crate provides the core library functionality for shimbind,
//! including shim discovery, member binding resolution, adapter emission
//! and the runtime dispatch model the generated registry follows.

pub mod core;
pub mod emit;
pub mod matcher;
pub mod ops;
pub mod resolver;
pub mod runtime;
pub mod util;

/// Test utilities and fixtures for shimbind unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides program models built in code and as TOML
/// model files.
#[cfg(test)]
pub mod test_support;

pub use core::{
    binding::Binding, definition::ShimDefinition, program::Program, target::ShimTarget,
    types::TypeRef,
};

pub use emit::{Emitter, RendererKind};
pub use resolver::{Resolution, Session};

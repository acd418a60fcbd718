//! Autolinking - native module discovery and linking for React Native projects
//!
//! This crate provides the core library functionality for autolinking,
//! including package discovery, per-platform module resolution, graph
//! merging and emission of native build configuration.

pub mod core;
pub mod discovery;
pub mod emit;
pub mod ops;
pub mod platforms;
pub mod resolver;
pub mod util;

/// Test utilities and fixtures for autolinking unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It lays out throwaway project trees with `node_modules`
/// directories and native sources.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    descriptor::ModuleDescriptor, module_config::ModuleConfig, package::Package,
    platform::Platform, project::Project,
};

pub use resolver::{AutolinkError, AutolinkErrors, ResolvedGraph};
pub use util::context::GlobalContext;

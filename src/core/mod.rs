//! Core data structures for autolinking.
//!
//! This module contains the foundational types used throughout the crate:
//! - Platforms and the project being linked
//! - Packages and their module configs
//! - Per-platform module descriptors

pub mod descriptor;
pub mod module_config;
pub mod package;
pub mod platform;
pub mod project;

pub use descriptor::{
    AarProject, AndroidModule, AppleModule, GradlePlugin, ModuleDescriptor, PodDescriptor,
    ProjectDescriptor,
};
pub use module_config::ModuleConfig;
pub use package::{DuplicateRevision, Package, PackageJson};
pub use platform::Platform;
pub use project::{find_project_root, Project, ProjectError};

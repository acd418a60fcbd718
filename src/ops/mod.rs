//! High-level operations.
//!
//! This module contains the implementation of autolinking commands.

pub mod autolink;
pub mod verify;

pub use autolink::{autolink, default_target_dir, resolve_graph, AutolinkOptions, AutolinkResult};
pub use verify::{format_result, verify, VerifyOptions, VerifyResult};

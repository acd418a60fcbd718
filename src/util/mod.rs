//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod pool;
pub mod properties;
pub mod shell;

pub use config::AutolinkingOptions;
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;

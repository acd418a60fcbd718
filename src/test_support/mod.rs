//! Test utilities for autolinking unit tests.
//!
//! Fixtures lay out real project trees in temp directories, since discovery
//! and the resolvers read the filesystem directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use autolinking::test_support::ProjectFixture;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ProjectFixture::new(&["expo-foo"]);
//!     fixture.add_package("expo-foo", "1.0.0", Some("{}"));
//!     fixture.write("node_modules/expo-foo/android/build.gradle", "");
//!
//!     let project = fixture.project(Platform::Android, Default::default());
//!     // Resolve the project...
//! }
//! ```

pub mod fixtures;

// Re-export fixtures for convenience
pub use fixtures::*;

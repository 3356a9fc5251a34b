//! Testing utilities for the Docbuilder workspace
//!
//! Document fixture builders plus a scriptable in-memory API fake. Used by
//! the engine's unit and integration tests; kept out of production builds.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod fake_api;
pub mod fixtures;

pub use fake_api::{CallCounts, FakeApi};
pub use fixtures::{document, gated_subsection, subsection, DocumentBuilder};

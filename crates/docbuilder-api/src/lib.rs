//! Docbuilder remote API boundary
//!
//! Defines the [`DocbuilderApi`] trait the engine is written against, the
//! wire types that cross it, and an HTTP implementation. The engine never
//! sees a transport type: only this trait and [`ApiError`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;
pub mod http;
pub mod types;

// Re-exports for convenience
pub use client::DocbuilderApi;
pub use error::ApiError;
pub use http::HttpApi;
pub use types::{
    AnswerFilter, AnswerRecord, PreviewContent, RenderMode, SubmitAnswerRequest,
    SubmittableMeta, SubmittableStatus,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

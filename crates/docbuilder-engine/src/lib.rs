//! Docbuilder session engine
//!
//! The client-side runtime of the document wizard:
//! - [`AnswerStore`]: normalized answer cache, one entry per question
//! - [`StatusProcessor`]: derives each subsection's completion status
//! - [`PreviewCache`]: tracks which rendered content is stale and re-fetches
//!   it under per-request cancellation
//! - [`Readiness`]: combines content, requirements and submittable state
//!   into one composite signal for UI gating
//! - [`Session`]: owns all of the above for one (document, organization)
//!   pair and sequences every mutation
//!
//! # Example
//!
//! ```rust,ignore
//! use docbuilder_engine::{Session, SessionConfig};
//! use docbuilder_api::HttpApi;
//! use docbuilder_model::OrganizationId;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpApi::new("https://api.example.test/v1"));
//! let session = Session::load(api, "annual-plan", OrganizationId(7), SessionConfig::new()).await?;
//!
//! println!("read-only: {}", session.read_only());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod answers;
pub mod error;
pub mod preview;
pub mod readiness;
pub mod session;
pub mod status;

// Re-exports for convenience
pub use answers::AnswerStore;
pub use error::EngineError;
pub use preview::{PreviewCache, RefreshScope};
pub use readiness::{ContentSlot, Readiness};
pub use session::{Session, SessionConfig, SubmitOutcome};
pub use status::{requirements_met, StatusProcessor, SubsectionStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the session engine
    pub use crate::{
        AnswerStore, ContentSlot, EngineError, PreviewCache, Readiness, RefreshScope, Session,
        SessionConfig, StatusProcessor, SubmitOutcome, SubsectionStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Identifier newtypes for the document tree
//!
//! All identifiers are assigned by the remote API and are plain integers on
//! the wire. Distinct newtypes keep section/subsection/question lookups from
//! being accidentally cross-wired.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw integer value as assigned by the server
            #[inline]
            #[must_use]
            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type! {
    /// Unique document identifier
    DocumentId
}

id_type! {
    /// Unique section identifier
    SectionId
}

id_type! {
    /// Unique subsection identifier
    SubsectionId
}

id_type! {
    /// Unique question identifier
    QuestionId
}

id_type! {
    /// Unique organization identifier
    OrganizationId
}

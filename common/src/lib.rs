//! Common code shared between the classifier tooling and recordings.
pub mod protocol;

/// Error type.
pub type Error = Box<dyn std::error::Error>;

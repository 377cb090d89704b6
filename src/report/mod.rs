//! Report model for tracked runs.
//!
//! This module handles:
//! - Defining the versioned profile schema
//! - Building a profile from a run result
//! - Rendering a plain-text summary

pub mod builder;
pub mod schema;
pub mod summary;

// Re-export main types
pub use builder::{to_default_profile, to_profile};
pub use schema::{HotSpan, Profile, SlowSpan, StatRow};
pub use summary::generate_text_summary;

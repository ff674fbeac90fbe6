//! Client-side editing state for allocation drafts.
//!
//! The editor keeps a draft and its validation result in step: every change
//! is followed by a fresh validation so the UI can show errors immediately.

mod input;
mod state;

pub use input::{LineField, coerce_amount};
pub use state::{AllocationEditor, EditorPhase, RequestToken};

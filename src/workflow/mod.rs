//! Allocation persistence, approval lifecycle and export.
//!
//! Drafts are kept in memory for the lifetime of the process.

mod export;
mod service;
mod store;

pub use export::{ExportFile, ExportFormat, render_export};
pub use service::{AllocationService, SavedDraft};
pub use store::AllocationStore;

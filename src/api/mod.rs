//! HTTP API module for budget allocation.
//!
//! This module provides the REST API endpoints for listing departments,
//! distributing budgets, saving and validating drafts, moving them through
//! approval and exporting them.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AutoDistributeRequest, DraftRequest, ExportQuery, LineRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;

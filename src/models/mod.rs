//! Core data models for the Budget Allocation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod allocation;
mod audit;
mod department;
mod period;
mod validation_result;

pub use allocation::{AllocationDraft, AllocationLine, AllocationStatus, BudgetCategory, Priority};
pub use audit::{AuditStep, AuditWarning};
pub use department::{Department, DepartmentStatus};
pub use period::{Period, Quarter};
pub use validation_result::{ValidationIssue, ValidationResult};

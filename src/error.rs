//! Error types for the Budget Allocation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while distributing, editing and
//! submitting budget allocations.
//!
//! Business-rule violations (over-allocation, negative lines) are not errors:
//! they are reported through [`ValidationResult`](crate::models::ValidationResult).

use thiserror::Error;
use uuid::Uuid;

use crate::models::{AllocationStatus, ValidationResult};

/// The main error type for the Budget Allocation Engine.
///
/// # Example
///
/// ```
/// use budget_allocation::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A department id did not match any known department.
    #[error("Department not found: {id}")]
    DepartmentNotFound {
        /// The department id that was not found.
        id: String,
    },

    /// No allocation draft exists with the given id.
    #[error("Allocation not found: {id}")]
    AllocationNotFound {
        /// The allocation id that was not found.
        id: Uuid,
    },

    /// No allocation draft exists for the requested period.
    #[error("No allocation found for period {period}")]
    NoAllocationForPeriod {
        /// The period label (e.g. "2026-Q4").
        period: String,
    },

    /// An editing operation was attempted before any draft was loaded.
    #[error("No allocation draft is loaded")]
    NoDraftLoaded,

    /// The total budget supplied was not usable.
    #[error("Invalid budget: {message}")]
    InvalidBudget {
        /// A description of what made the budget invalid.
        message: String,
    },

    /// An edited line value could not be interpreted.
    #[error("Invalid value for line field '{field}': {message}")]
    InvalidLineValue {
        /// The field being edited.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// The draft is no longer editable.
    #[error("Allocation is locked for editing (status: {status})")]
    DraftLocked {
        /// The current status of the draft.
        status: AllocationStatus,
    },

    /// The draft was modified by someone else since it was loaded.
    #[error("Version conflict: expected version {expected}, found {actual}")]
    VersionConflict {
        /// The version the caller based its edit on.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// A status transition is not permitted by the approval lifecycle.
    #[error("Cannot move allocation from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: AllocationStatus,
        /// The requested status.
        to: AllocationStatus,
    },

    /// Submission was refused because the draft does not validate.
    #[error("Submission blocked by {} validation error(s)", .validation.errors.len())]
    SubmissionBlocked {
        /// The validation result that blocked submission.
        validation: Box<ValidationResult>,
    },

    /// The requested export format is not supported.
    #[error("Unsupported export format: {format}")]
    UnsupportedExportFormat {
        /// The requested format.
        format: String,
    },

    /// Rendering an export failed.
    #[error("Export failed: {message}")]
    ExportError {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_department_not_found_displays_id() {
        let error = EngineError::DepartmentNotFound {
            id: "dept_999".to_string(),
        };
        assert_eq!(error.to_string(), "Department not found: dept_999");
    }

    #[test]
    fn test_draft_locked_displays_status() {
        let error = EngineError::DraftLocked {
            status: AllocationStatus::PendingApproval,
        };
        assert_eq!(
            error.to_string(),
            "Allocation is locked for editing (status: pending_approval)"
        );
    }

    #[test]
    fn test_version_conflict_displays_versions() {
        let error = EngineError::VersionConflict {
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            error.to_string(),
            "Version conflict: expected version 2, found 3"
        );
    }

    #[test]
    fn test_invalid_transition_displays_statuses() {
        let error = EngineError::InvalidTransition {
            from: AllocationStatus::Draft,
            to: AllocationStatus::Approved,
        };
        assert_eq!(
            error.to_string(),
            "Cannot move allocation from draft to approved"
        );
    }

    #[test]
    fn test_submission_blocked_counts_errors() {
        let mut validation = ValidationResult::empty();
        validation.errors.push(crate::models::ValidationIssue::new(
            "OVER_ALLOCATED",
            "Allocated exceeds total",
        ));
        let error = EngineError::SubmissionBlocked {
            validation: Box::new(validation),
        };
        assert_eq!(
            error.to_string(),
            "Submission blocked by 1 validation error(s)"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::AllocationNotFound { id: Uuid::nil() })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}

//! Validation result models.
//!
//! A [`ValidationResult`] is derived from a draft on every edit and is never
//! persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single error or warning raised while validating a draft.
///
/// Issues tied to one line carry its `department_id` so they can be shown
/// next to the offending field; all issues together form the summary banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// A code identifying the rule that raised the issue.
    pub code: String,
    /// A human-readable description.
    pub message: String,
    /// The department whose line raised the issue, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
}

impl ValidationIssue {
    /// Creates an issue that applies to the draft as a whole.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            department_id: None,
        }
    }

    /// Creates an issue attached to one department's line.
    pub fn for_line(
        code: impl Into<String>,
        message: impl Into<String>,
        department_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            department_id: Some(department_id.into()),
        }
    }
}

/// The outcome of validating an allocation draft.
///
/// # Example
///
/// ```
/// use budget_allocation::models::ValidationResult;
/// use rust_decimal::Decimal;
///
/// let result = ValidationResult::empty();
/// assert!(result.overall_valid);
/// assert_eq!(result.efficiency, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when there are no errors. Warnings do not affect validity.
    pub overall_valid: bool,
    /// Rule violations that block submission.
    pub errors: Vec<ValidationIssue>,
    /// Advisory findings.
    pub warnings: Vec<ValidationIssue>,
    /// Percentage of the total budget allocated, clamped to [0, 100].
    pub efficiency: Decimal,
    /// Sum of all line amounts.
    pub total_allocated: Decimal,
    /// Total budget minus the allocated sum; negative when over-allocated.
    pub remaining: Decimal,
}

impl ValidationResult {
    /// A valid result with nothing allocated.
    pub fn empty() -> Self {
        Self {
            overall_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            efficiency: Decimal::ZERO,
            total_allocated: Decimal::ZERO,
            remaining: Decimal::ZERO,
        }
    }

    /// Returns true if the draft may be submitted for approval.
    pub fn allows_submission(&self) -> bool {
        self.overall_valid && self.remaining >= Decimal::ZERO
    }

    /// Returns the errors and warnings attached to one department's line.
    pub fn issues_for(&self, department_id: &str) -> Vec<&ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(|i| i.department_id.as_deref() == Some(department_id))
            .collect()
    }
}

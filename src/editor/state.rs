//! In-memory editing state for an allocation draft.
//!
//! The editor owns the draft being worked on and keeps its
//! [`ValidationResult`] current after every change. Read-only enforcement
//! here is a convenience for the UI; the server checks again on save.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::allocation::{Distribution, validate};
use crate::config::ValidationRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllocationDraft, BudgetCategory, Department, Period, Priority, ValidationResult,
};

use super::input::{LineField, coerce_amount};

/// Where the editor is in the allocation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorPhase {
    /// No draft loaded.
    Empty,
    /// A draft is loaded and does not yet pass validation.
    Editing,
    /// The draft passes validation and may be submitted.
    Validated,
    /// The draft has left the draft status and is read-only.
    Submitted,
}

/// Identifies one server fetch started by the editor.
///
/// Only the response to the most recently started fetch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Editing state for one allocation draft.
///
/// # Example
///
/// ```
/// use budget_allocation::config::ValidationRules;
/// use budget_allocation::editor::{AllocationEditor, EditorPhase, LineField};
/// use budget_allocation::models::{Department, DepartmentStatus, Period, Quarter};
/// use rust_decimal::Decimal;
///
/// let departments = vec![Department {
///     id: "dept_eng".to_string(),
///     name: "Engineering".to_string(),
///     code: "ENG".to_string(),
///     head: String::new(),
///     current_budget: Decimal::ZERO,
///     employee_count: 10,
///     status: DepartmentStatus::Active,
/// }];
///
/// let mut editor = AllocationEditor::new(ValidationRules::default());
/// editor.start_new(Period { year: 2026, quarter: Quarter::Q4 }, Decimal::new(1000, 0), &departments);
/// editor.set_line("dept_eng", LineField::Amount, "1000").unwrap();
///
/// assert_eq!(editor.phase(), EditorPhase::Validated);
/// assert!(editor.can_submit());
/// ```
#[derive(Debug, Clone)]
pub struct AllocationEditor {
    draft: Option<AllocationDraft>,
    validation: ValidationResult,
    rules: ValidationRules,
    latest_request: u64,
}

impl AllocationEditor {
    /// Creates an editor with no draft loaded.
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            draft: None,
            validation: ValidationResult::empty(),
            rules,
            latest_request: 0,
        }
    }

    /// Starts a fresh draft with a zero line for every active department.
    pub fn start_new(&mut self, period: Period, total_budget: Decimal, departments: &[Department]) {
        self.draft = Some(AllocationDraft::for_departments(
            period,
            total_budget,
            departments,
        ));
        self.revalidate();
    }

    /// Returns the draft being edited, if any.
    pub fn draft(&self) -> Option<&AllocationDraft> {
        self.draft.as_ref()
    }

    /// Returns the validation result for the current draft.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Returns the current lifecycle phase.
    pub fn phase(&self) -> EditorPhase {
        match &self.draft {
            None => EditorPhase::Empty,
            Some(draft) if !draft.is_editable() => EditorPhase::Submitted,
            Some(_) if self.validation.allows_submission() => EditorPhase::Validated,
            Some(_) => EditorPhase::Editing,
        }
    }

    /// Returns true if edits are refused.
    pub fn is_read_only(&self) -> bool {
        self.draft.as_ref().is_none_or(|d| !d.is_editable())
    }

    /// Returns true if the draft may be submitted for approval.
    pub fn can_submit(&self) -> bool {
        !self.is_read_only() && self.validation.allows_submission()
    }

    /// Edits one field of one department's line.
    ///
    /// Amounts that do not parse become zero. Other lines are never touched.
    ///
    /// # Errors
    ///
    /// - `NoDraftLoaded` if there is no draft
    /// - `DraftLocked` if the draft is no longer in draft status
    /// - `DepartmentNotFound` if the draft has no line for the department
    /// - `InvalidLineValue` for an unknown category or priority
    pub fn set_line(&mut self, department_id: &str, field: LineField, value: &str) -> EngineResult<()> {
        let draft = self.editable_draft()?;
        let line = draft
            .line_mut(department_id)
            .ok_or_else(|| EngineError::DepartmentNotFound {
                id: department_id.to_string(),
            })?;

        match field {
            LineField::Amount => line.amount = coerce_amount(value),
            LineField::Category => line.category = BudgetCategory::from_str(value)?,
            LineField::Priority => line.priority = Priority::from_str(value)?,
            LineField::Notes => line.notes = value.to_string(),
        }

        debug!(department_id, field = %field, "Allocation line edited");
        self.revalidate();
        Ok(())
    }

    /// Changes the total budget, coercing unparseable input to zero.
    pub fn set_total_budget(&mut self, value: &str) -> EngineResult<()> {
        let draft = self.editable_draft()?;
        draft.total_budget = coerce_amount(value);
        self.revalidate();
        Ok(())
    }

    /// Replaces the local state with a draft fetched from the server.
    ///
    /// This is the only way to discard local edits.
    pub fn reset_from_server(&mut self, mut draft: AllocationDraft) {
        draft.sort_lines();
        self.draft = Some(draft);
        self.revalidate();
    }

    /// Starts a server fetch and returns the token its response must carry.
    pub fn begin_request(&mut self) -> RequestToken {
        self.latest_request += 1;
        RequestToken(self.latest_request)
    }

    /// Applies a fetched draft unless a newer fetch has been started since.
    ///
    /// Returns true if the draft was applied.
    pub fn accept_server_draft(&mut self, token: RequestToken, draft: AllocationDraft) -> bool {
        if token.0 != self.latest_request {
            warn!(
                token = token.0,
                latest = self.latest_request,
                "Ignoring superseded allocation response"
            );
            return false;
        }
        self.reset_from_server(draft);
        true
    }

    /// Copies auto-distributed amounts onto the matching lines.
    ///
    /// Lines for departments missing from the distribution keep their amount.
    /// Returns the number of lines updated.
    pub fn apply_distribution(&mut self, distribution: &Distribution) -> EngineResult<usize> {
        let draft = self.editable_draft()?;

        let mut applied = 0;
        for share in &distribution.shares {
            match draft.line_mut(&share.department_id) {
                Some(line) => {
                    line.amount = share.amount;
                    applied += 1;
                }
                None => warn!(
                    department_id = %share.department_id,
                    "Distribution share has no matching line"
                ),
            }
        }

        debug!(
            strategy = %distribution.strategy,
            applied,
            preview = distribution.is_preview,
            "Distribution applied"
        );
        self.revalidate();
        Ok(applied)
    }

    fn editable_draft(&mut self) -> EngineResult<&mut AllocationDraft> {
        let draft = self.draft.as_mut().ok_or(EngineError::NoDraftLoaded)?;
        if !draft.is_editable() {
            return Err(EngineError::DraftLocked {
                status: draft.status,
            });
        }
        Ok(draft)
    }

    fn revalidate(&mut self) {
        self.validation = match &self.draft {
            Some(draft) => validate(draft, &self.rules),
            None => ValidationResult::empty(),
        };
    }
}

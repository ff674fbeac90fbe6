//! Allocation draft models.
//!
//! This module contains the [`AllocationDraft`] type and its lines, together
//! with the fixed enums used on each line and the approval lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

use super::{Department, Period};

/// The approval lifecycle status of an allocation.
///
/// ```text
/// draft ──submit──▶ pending_approval ──approve──▶ approved
///                                    └─reject───▶ rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    /// Editable proposal.
    #[default]
    Draft,
    /// Submitted and awaiting a decision.
    PendingApproval,
    /// Accepted.
    Approved,
    /// Declined.
    Rejected,
}

impl AllocationStatus {
    /// Returns true if lines may still be edited.
    pub fn is_editable(self) -> bool {
        self == AllocationStatus::Draft
    }

    /// Returns true if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: AllocationStatus) -> bool {
        matches!(
            (self, next),
            (AllocationStatus::Draft, AllocationStatus::PendingApproval)
                | (AllocationStatus::PendingApproval, AllocationStatus::Approved)
                | (AllocationStatus::PendingApproval, AllocationStatus::Rejected)
        )
    }
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AllocationStatus::Draft => "draft",
            AllocationStatus::PendingApproval => "pending_approval",
            AllocationStatus::Approved => "approved",
            AllocationStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// The fixed set of budget categories a line can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCategory {
    /// Salaries and benefits.
    Personnel,
    /// Day-to-day running costs.
    #[default]
    Operations,
    /// Physical equipment.
    Equipment,
    /// Software, hardware and IT services.
    Technology,
    /// Courses and certifications.
    Training,
    /// Travel and accommodation.
    Travel,
    /// Advertising and events.
    Marketing,
    /// Rent, utilities and maintenance.
    Facilities,
    /// Anything else.
    Other,
}

impl BudgetCategory {
    /// All categories in display order.
    pub const ALL: [BudgetCategory; 9] = [
        BudgetCategory::Personnel,
        BudgetCategory::Operations,
        BudgetCategory::Equipment,
        BudgetCategory::Technology,
        BudgetCategory::Training,
        BudgetCategory::Travel,
        BudgetCategory::Marketing,
        BudgetCategory::Facilities,
        BudgetCategory::Other,
    ];

    /// Returns the wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetCategory::Personnel => "personnel",
            BudgetCategory::Operations => "operations",
            BudgetCategory::Equipment => "equipment",
            BudgetCategory::Technology => "technology",
            BudgetCategory::Training => "training",
            BudgetCategory::Travel => "travel",
            BudgetCategory::Marketing => "marketing",
            BudgetCategory::Facilities => "facilities",
            BudgetCategory::Other => "other",
        }
    }
}

impl FromStr for BudgetCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        BudgetCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| EngineError::InvalidLineValue {
                field: "category".to_string(),
                message: format!("unknown budget category '{}'", s.trim()),
            })
    }
}

/// How urgently a department needs its allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Nice to have.
    Low,
    /// Normal.
    #[default]
    Medium,
    /// Important.
    High,
    /// Must be funded.
    Critical,
}

impl Priority {
    /// Returns the wire name of the priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl FromStr for Priority {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(EngineError::InvalidLineValue {
                field: "priority".to_string(),
                message: format!("unknown priority '{}'", other),
            }),
        }
    }
}

/// A single department's share of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    /// The department this line funds.
    pub department_id: String,
    /// Sort key for display; lines are kept ordered by this value.
    #[serde(default)]
    pub position: u32,
    /// The allocated amount.
    pub amount: Decimal,
    /// The budget category for this line.
    #[serde(default)]
    pub category: BudgetCategory,
    /// The priority of this line.
    #[serde(default)]
    pub priority: Priority,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Snapshot of the department's prior budget, for delta display.
    #[serde(default)]
    pub previous_amount: Decimal,
}

impl AllocationLine {
    /// Creates an empty line for a department.
    pub fn for_department(department: &Department, position: u32) -> Self {
        Self {
            department_id: department.id.clone(),
            position,
            amount: Decimal::ZERO,
            category: BudgetCategory::default(),
            priority: Priority::default(),
            notes: String::new(),
            previous_amount: department.current_budget,
        }
    }

    /// Returns the change compared with the previous budget.
    pub fn change(&self) -> Decimal {
        self.amount.saturating_sub(self.previous_amount)
    }
}

/// An allocation proposal for one budget period.
///
/// # Example
///
/// ```
/// use budget_allocation::models::{AllocationDraft, AllocationStatus, Period, Quarter};
/// use rust_decimal::Decimal;
///
/// let period = Period { year: 2026, quarter: Quarter::Q4 };
/// let draft = AllocationDraft::new(period, Decimal::new(100_000, 0));
///
/// assert_eq!(draft.status, AllocationStatus::Draft);
/// assert_eq!(draft.remaining(), Decimal::new(100_000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDraft {
    /// Server-assigned identifier; `None` until first saved.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Incremented on every save.
    #[serde(default)]
    pub version: u64,
    /// The budget period.
    pub period: Period,
    /// The total budget available for the period.
    pub total_budget: Decimal,
    /// The lifecycle status.
    #[serde(default)]
    pub status: AllocationStatus,
    /// Lines ordered by `position`.
    #[serde(default)]
    pub lines: Vec<AllocationLine>,
    /// When the draft was first saved.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the draft was last saved.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AllocationDraft {
    /// Creates an unsaved draft with no lines.
    pub fn new(period: Period, total_budget: Decimal) -> Self {
        Self {
            id: None,
            version: 0,
            period,
            total_budget,
            status: AllocationStatus::Draft,
            lines: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Creates an unsaved draft with a zero line for every active department.
    pub fn for_departments(
        period: Period,
        total_budget: Decimal,
        departments: &[Department],
    ) -> Self {
        let mut draft = Self::new(period, total_budget);
        draft.lines = departments
            .iter()
            .filter(|d| d.is_active())
            .enumerate()
            .map(|(i, d)| AllocationLine::for_department(d, i as u32))
            .collect();
        draft
    }

    /// Returns the line for a department, if present.
    pub fn line(&self, department_id: &str) -> Option<&AllocationLine> {
        self.lines.iter().find(|l| l.department_id == department_id)
    }

    /// Returns a mutable reference to the line for a department, if present.
    pub fn line_mut(&mut self, department_id: &str) -> Option<&mut AllocationLine> {
        self.lines
            .iter_mut()
            .find(|l| l.department_id == department_id)
    }

    /// Sum of all line amounts, saturating at the decimal range.
    pub fn total_allocated(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.amount))
    }

    /// Budget left after all lines, negative when over-allocated.
    pub fn remaining(&self) -> Decimal {
        self.total_budget.saturating_sub(self.total_allocated())
    }

    /// Returns true if lines may still be edited.
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Restores the ordering invariant after lines were replaced wholesale.
    pub fn sort_lines(&mut self) {
        self.lines.sort_by_key(|l| l.position);
    }
}

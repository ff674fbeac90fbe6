//! Request types for the Budget Allocation API.
//!
//! This module defines the JSON request structures accepted by the
//! allocation endpoints.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::allocation::DistributionStrategy;
use crate::models::{
    AllocationDraft, AllocationLine, AllocationStatus, BudgetCategory, Department, Period, Priority,
};

/// Request body for `POST /api/budget-allocations/auto-distribute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoDistributeRequest {
    /// The budget to split.
    pub total_budget: Decimal,
    /// The distribution rule.
    pub strategy: DistributionStrategy,
    /// Priority per department id for the priority strategy.
    #[serde(default)]
    pub priorities: HashMap<String, Priority>,
    /// Restricts the split to these departments; all departments when absent.
    #[serde(default)]
    pub department_ids: Option<Vec<String>>,
}

/// One line of a draft in a create, update or validate request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRequest {
    /// The department this line funds.
    pub department_id: String,
    /// Sort key; defaults to the line's index in the request.
    #[serde(default)]
    pub position: Option<u32>,
    /// The allocated amount.
    pub amount: Decimal,
    /// The budget category.
    #[serde(default)]
    pub category: BudgetCategory,
    /// The priority.
    #[serde(default)]
    pub priority: Priority,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Prior budget snapshot; defaults to the department's current budget.
    #[serde(default)]
    pub previous_amount: Option<Decimal>,
}

/// Request body for creating, updating or validating a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    /// The version the edit is based on; ignored on create.
    #[serde(default)]
    pub version: u64,
    /// The budget period.
    pub period: Period,
    /// The total budget.
    pub total_budget: Decimal,
    /// The allocation lines.
    #[serde(default)]
    pub lines: Vec<LineRequest>,
}

impl DraftRequest {
    /// Builds a draft, filling line defaults from the department registry.
    pub fn into_draft(self, id: Option<Uuid>, departments: &[Department]) -> AllocationDraft {
        let lines = self
            .lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let previous_amount = line.previous_amount.unwrap_or_else(|| {
                    departments
                        .iter()
                        .find(|d| d.id == line.department_id)
                        .map(|d| d.current_budget)
                        .unwrap_or(Decimal::ZERO)
                });
                AllocationLine {
                    position: line.position.unwrap_or(index as u32),
                    department_id: line.department_id,
                    amount: line.amount,
                    category: line.category,
                    priority: line.priority,
                    notes: line.notes,
                    previous_amount,
                }
            })
            .collect();

        AllocationDraft {
            id,
            version: self.version,
            period: self.period,
            total_budget: self.total_budget,
            status: AllocationStatus::Draft,
            lines,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Query string for `GET /api/budget-allocations/export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportQuery {
    /// File format, `csv` when absent.
    #[serde(default = "default_format")]
    pub format: String,
    /// The allocation to export.
    #[serde(rename = "allocationId")]
    pub allocation_id: Uuid,
}

fn default_format() -> String {
    "csv".to_string()
}

//! Allocation validation.
//!
//! [`validate`] checks a draft against the total budget, non-negativity and
//! per-department caps. It never fails: every finding is reported in the
//! returned [`ValidationResult`]. It is cheap enough to run on every edit,
//! and the server runs it again before any state transition.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::config::ValidationRules;
use crate::models::{AllocationDraft, ValidationIssue, ValidationResult};

/// Error: the total budget is negative.
pub const NEGATIVE_BUDGET: &str = "NEGATIVE_BUDGET";
/// Error: a line amount is negative.
pub const NEGATIVE_AMOUNT: &str = "NEGATIVE_AMOUNT";
/// Error: a single line is larger than the whole budget.
pub const EXCEEDS_TOTAL: &str = "EXCEEDS_TOTAL";
/// Error: a line is above its department's cap.
pub const EXCEEDS_CAP: &str = "EXCEEDS_CAP";
/// Error: the same department appears on more than one line.
pub const DUPLICATE_LINE: &str = "DUPLICATE_LINE";
/// Error: the lines add up to more than the total budget.
pub const OVER_ALLOCATED: &str = "OVER_ALLOCATED";
/// Error: the amounts are too large to add up exactly.
pub const AMOUNT_OUT_OF_RANGE: &str = "AMOUNT_OUT_OF_RANGE";
/// Warning: a line takes more than the concentration threshold.
pub const CONCENTRATION: &str = "CONCENTRATION";
/// Warning: part of the budget is not allocated.
pub const UNALLOCATED: &str = "UNALLOCATED";
/// Warning: the draft has no lines.
pub const NO_LINES: &str = "NO_LINES";

/// Validates an allocation draft.
///
/// # Examples
///
/// ```
/// use budget_allocation::allocation::validate;
/// use budget_allocation::config::ValidationRules;
/// use budget_allocation::models::{AllocationDraft, Period, Quarter};
/// use rust_decimal::Decimal;
///
/// let draft = AllocationDraft::new(Period { year: 2026, quarter: Quarter::Q1 }, Decimal::new(1000, 0));
/// let result = validate(&draft, &ValidationRules::default());
///
/// assert!(result.overall_valid);
/// assert_eq!(result.efficiency, Decimal::ZERO);
/// assert_eq!(result.remaining, Decimal::new(1000, 0));
/// ```
pub fn validate(draft: &AllocationDraft, rules: &ValidationRules) -> ValidationResult {
    let total_budget = draft.total_budget;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let totals = draft
        .lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.amount))
        .and_then(|allocated| {
            total_budget
                .checked_sub(allocated)
                .map(|remaining| (allocated, remaining))
        });
    let (total_allocated, remaining) = match totals {
        Some(totals) => totals,
        None => {
            errors.push(ValidationIssue::new(
                AMOUNT_OUT_OF_RANGE,
                "Allocated amounts are too large to total",
            ));
            (draft.total_allocated(), draft.remaining())
        }
    };

    if total_budget < Decimal::ZERO {
        errors.push(ValidationIssue::new(
            NEGATIVE_BUDGET,
            format!("Total budget {} cannot be negative", total_budget),
        ));
    }

    if draft.lines.is_empty() {
        warnings.push(ValidationIssue::new(
            NO_LINES,
            "No departments have been allocated budget",
        ));
    }

    let concentration_limit = total_budget.saturating_mul(rules.concentration_threshold);
    let mut seen = HashSet::new();

    for line in &draft.lines {
        let id = line.department_id.as_str();

        if !seen.insert(id) {
            errors.push(ValidationIssue::for_line(
                DUPLICATE_LINE,
                format!("Department {} appears on more than one line", id),
                id,
            ));
        }

        if line.amount < Decimal::ZERO {
            errors.push(ValidationIssue::for_line(
                NEGATIVE_AMOUNT,
                format!("Allocation for {} cannot be negative ({})", id, line.amount),
                id,
            ));
            continue;
        }

        if total_budget >= Decimal::ZERO && line.amount > total_budget {
            errors.push(ValidationIssue::for_line(
                EXCEEDS_TOTAL,
                format!(
                    "Allocation for {} ({}) exceeds the total budget ({})",
                    id, line.amount, total_budget
                ),
                id,
            ));
        } else if total_budget > Decimal::ZERO && line.amount > concentration_limit {
            warnings.push(ValidationIssue::for_line(
                CONCENTRATION,
                format!(
                    "Allocation for {} is {}% of the total budget",
                    id,
                    percentage(line.amount, total_budget).unwrap_or(Decimal::ONE_HUNDRED)
                ),
                id,
            ));
        }

        if let Some(cap) = rules.department_caps.get(id) {
            if line.amount > *cap {
                errors.push(ValidationIssue::for_line(
                    EXCEEDS_CAP,
                    format!(
                        "Allocation for {} ({}) exceeds its cap of {}",
                        id, line.amount, cap
                    ),
                    id,
                ));
            }
        }
    }

    if remaining < Decimal::ZERO {
        errors.push(ValidationIssue::new(
            OVER_ALLOCATED,
            format!(
                "Allocated {} exceeds the total budget of {} by {}",
                total_allocated, total_budget, -remaining
            ),
        ));
    } else if remaining > Decimal::ZERO && total_allocated > Decimal::ZERO {
        warnings.push(ValidationIssue::new(
            UNALLOCATED,
            format!("{} of the total budget is not yet allocated", remaining),
        ));
    }

    let efficiency = if total_budget > Decimal::ZERO {
        // overflow only happens far outside the 0..=100 range
        let overflowed = if total_allocated > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        percentage(total_allocated, total_budget)
            .unwrap_or(overflowed)
            .max(Decimal::ZERO)
            .min(Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };

    ValidationResult {
        overall_valid: errors.is_empty(),
        errors,
        warnings,
        efficiency,
        total_allocated,
        remaining,
    }
}

fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|p| p.round_dp(2))
}

//! Auto-distribution strategies.
//!
//! This module splits a total budget across departments using one of four
//! strategies: equal split, employee headcount, previous budgets, or
//! caller-supplied priorities.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DistributionSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, Department, Priority};

use super::apportion::{absorbing_index, apportion, checked_sum, split_equally};

/// Warning code raised when there is nothing to distribute to.
pub const NO_DEPARTMENTS_WARNING: &str = "NO_DEPARTMENTS";

/// Warning code raised when a weighted strategy had no usable weights.
pub const EQUAL_FALLBACK_WARNING: &str = "EQUAL_SPLIT_FALLBACK";

/// Warning code raised when a department was passed in more than once.
pub const DUPLICATE_DEPARTMENT_WARNING: &str = "DUPLICATE_DEPARTMENT";

/// The rule used to auto-split a total budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionStrategy {
    /// Same amount for every department.
    Equal,
    /// Weighted by employee count.
    Proportional,
    /// Weighted by each department's previous budget.
    Previous,
    /// Weighted by caller-supplied priority.
    Priority,
}

impl DistributionStrategy {
    fn rule_name(self) -> &'static str {
        match self {
            DistributionStrategy::Equal => "Equal Split",
            DistributionStrategy::Proportional => "Headcount Proportional Split",
            DistributionStrategy::Previous => "Previous Budget Split",
            DistributionStrategy::Priority => "Priority Weighted Split",
        }
    }
}

impl fmt::Display for DistributionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DistributionStrategy::Equal => "equal",
            DistributionStrategy::Proportional => "proportional",
            DistributionStrategy::Previous => "previous",
            DistributionStrategy::Priority => "priority",
        };
        f.write_str(label)
    }
}

/// One department's part of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentShare {
    /// The department receiving the share.
    pub department_id: String,
    /// The weight used for this department.
    pub weight: Decimal,
    /// The amount allocated.
    pub amount: Decimal,
}

/// The result of auto-distributing a budget.
///
/// Shares follow the order of the departments passed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// The strategy that produced this distribution.
    pub strategy: DistributionStrategy,
    /// The budget that was split.
    pub total_budget: Decimal,
    /// Per-department amounts.
    pub shares: Vec<DepartmentShare>,
    /// Conditions the caller should surface to the user.
    pub warnings: Vec<AuditWarning>,
    /// How the split was computed.
    pub audit_step: AuditStep,
    /// True for locally computed estimates; the server result is authoritative.
    pub is_preview: bool,
}

impl Distribution {
    /// Returns the amount for a department, if it took part.
    pub fn amount_for(&self, department_id: &str) -> Option<Decimal> {
        self.shares
            .iter()
            .find(|s| s.department_id == department_id)
            .map(|s| s.amount)
    }

    /// Sum of all shares.
    pub fn total_allocated(&self) -> Decimal {
        self.shares
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.amount))
    }

    /// Returns true if nothing was distributed.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Marks this distribution as the authoritative server result.
    pub fn into_authoritative(mut self) -> Self {
        self.is_preview = false;
        self
    }
}

/// Splits `total_budget` across the active departments using `strategy`.
///
/// # Arguments
///
/// * `total_budget` - The budget to split; must not be negative
/// * `departments` - Candidate departments; inactive ones are skipped and
///   repeated ids only count once, at their first position
/// * `strategy` - The distribution rule
/// * `priorities` - Priority per department id, used by the priority strategy
///   (missing departments count as medium)
/// * `settings` - Allocation unit and priority weights
///
/// # Returns
///
/// Returns a preview [`Distribution`] whose amounts sum exactly to
/// `total_budget`, or an empty distribution with a warning when no department
/// is active. Fails with `InvalidBudget` if `total_budget` is negative, has
/// more decimal places than the allocation unit, or is too large to split.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use budget_allocation::allocation::{distribute, DistributionStrategy};
/// use budget_allocation::config::DistributionSettings;
///
/// let result = distribute(
///     rust_decimal::Decimal::new(100_000, 0),
///     &[],
///     DistributionStrategy::Equal,
///     &HashMap::new(),
///     &DistributionSettings::default(),
/// )
/// .unwrap();
///
/// assert!(result.is_empty());
/// assert_eq!(result.warnings[0].code, "NO_DEPARTMENTS");
/// ```
pub fn distribute(
    total_budget: Decimal,
    departments: &[Department],
    strategy: DistributionStrategy,
    priorities: &HashMap<String, Priority>,
    settings: &DistributionSettings,
) -> EngineResult<Distribution> {
    if total_budget < Decimal::ZERO {
        return Err(EngineError::InvalidBudget {
            message: format!("total budget {} is negative", total_budget),
        });
    }
    if total_budget.normalize().scale() > settings.unit_scale {
        return Err(EngineError::InvalidBudget {
            message: format!(
                "total budget {} is finer than the allocation unit ({} decimal places)",
                total_budget, settings.unit_scale
            ),
        });
    }

    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    let active: Vec<&Department> = departments
        .iter()
        .filter(|d| d.is_active())
        .filter(|d| {
            let first = seen.insert(d.id.as_str());
            if !first {
                duplicates.push(d.id.as_str());
            }
            first
        })
        .collect();

    if !duplicates.is_empty() {
        warnings.push(AuditWarning::new(
            DUPLICATE_DEPARTMENT_WARNING,
            format!(
                "Departments listed more than once were counted once: {}",
                duplicates.join(", ")
            ),
            "low",
        ));
    }

    if active.is_empty() {
        warnings.push(AuditWarning::new(
            NO_DEPARTMENTS_WARNING,
            "No active departments to distribute the budget across",
            "medium",
        ));
        let audit_step = build_audit_step(strategy, total_budget, &[], &active, None, false);
        return Ok(Distribution {
            strategy,
            total_budget,
            shares: Vec::new(),
            warnings,
            audit_step,
            is_preview: true,
        });
    }

    let weights: Vec<Decimal> = active
        .iter()
        .map(|d| weight_for(d, strategy, priorities, settings))
        .collect();

    let usable: Vec<Decimal> = weights.iter().map(|w| (*w).max(Decimal::ZERO)).collect();
    let weight_sum = checked_sum(&usable).ok_or_else(|| EngineError::InvalidBudget {
        message: format!("{} weights are too large to combine", strategy),
    })?;
    let fell_back = strategy != DistributionStrategy::Equal && weight_sum.is_zero();

    let amounts = if strategy == DistributionStrategy::Equal || fell_back {
        split_equally(total_budget, active.len(), settings.unit_scale)
    } else {
        apportion(total_budget, &weights, settings.unit_scale)?
    };

    if fell_back {
        warnings.push(AuditWarning::new(
            EQUAL_FALLBACK_WARNING,
            format!(
                "All {} weights are zero; budget was split equally",
                strategy
            ),
            "low",
        ));
    }

    let absorber = if strategy == DistributionStrategy::Equal || fell_back {
        0
    } else {
        absorbing_index(&weights)
    };

    let shares: Vec<DepartmentShare> = active
        .iter()
        .zip(weights.iter().zip(amounts))
        .map(|(d, (weight, amount))| DepartmentShare {
            department_id: d.id.clone(),
            weight: *weight,
            amount,
        })
        .collect();

    let audit_step = build_audit_step(
        strategy,
        total_budget,
        &shares,
        &active,
        Some(absorber),
        fell_back,
    );

    Ok(Distribution {
        strategy,
        total_budget,
        shares,
        warnings,
        audit_step,
        is_preview: true,
    })
}

fn weight_for(
    department: &Department,
    strategy: DistributionStrategy,
    priorities: &HashMap<String, Priority>,
    settings: &DistributionSettings,
) -> Decimal {
    match strategy {
        DistributionStrategy::Equal => Decimal::ONE,
        DistributionStrategy::Proportional => Decimal::from(department.employee_count),
        DistributionStrategy::Previous => department.current_budget.max(Decimal::ZERO),
        DistributionStrategy::Priority => {
            let priority = priorities
                .get(&department.id)
                .copied()
                .unwrap_or_default();
            settings.priority_weights.weight(priority).max(Decimal::ZERO)
        }
    }
}

fn build_audit_step(
    strategy: DistributionStrategy,
    total_budget: Decimal,
    shares: &[DepartmentShare],
    active: &[&Department],
    absorber: Option<usize>,
    fell_back: bool,
) -> AuditStep {
    let absorbing_department = absorber
        .and_then(|i| shares.get(i))
        .map(|s| s.department_id.clone());

    let reasoning = if shares.is_empty() {
        format!("No active departments; ${} left undistributed", total_budget.normalize())
    } else if fell_back {
        format!(
            "${} split equally across {} departments ({} weights were all zero)",
            total_budget.normalize(),
            shares.len(),
            strategy
        )
    } else {
        format!(
            "${} split across {} departments by {}; rounding remainder assigned to {}",
            total_budget.normalize(),
            shares.len(),
            strategy,
            absorbing_department.as_deref().unwrap_or("none")
        )
    };

    AuditStep {
        step_number: 1,
        rule_id: format!("distribution_{}", strategy),
        rule_name: strategy.rule_name().to_string(),
        input: serde_json::json!({
            "total_budget": total_budget.normalize().to_string(),
            "strategy": strategy.to_string(),
            "department_count": active.len()
        }),
        output: serde_json::json!({
            "allocated": shares.iter().map(|s| s.amount).sum::<Decimal>().normalize().to_string(),
            "absorbing_department": absorbing_department,
            "fallback_to_equal": fell_back
        }),
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DepartmentStatus;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn department(id: &str, employees: u32, current_budget: &str) -> Department {
        Department {
            id: id.to_string(),
            name: id.to_uppercase(),
            code: id.to_uppercase(),
            head: String::new(),
            current_budget: dec(current_budget),
            employee_count: employees,
            status: DepartmentStatus::Active,
        }
    }

    fn run(
        total: &str,
        departments: &[Department],
        strategy: DistributionStrategy,
    ) -> Distribution {
        distribute(
            dec(total),
            departments,
            strategy,
            &HashMap::new(),
            &DistributionSettings::default(),
        )
        .unwrap()
    }

    fn amounts(distribution: &Distribution) -> Vec<Decimal> {
        distribution.shares.iter().map(|s| s.amount).collect()
    }

    /// DS-001: equal split keeps the remainder on the first department
    #[test]
    fn test_equal_split_remainder_on_first() {
        let departments = vec![
            department("a", 1, "0"),
            department("b", 1, "0"),
            department("c", 1, "0"),
        ];
        let result = run("100000", &departments, DistributionStrategy::Equal);

        assert_eq!(amounts(&result), vec![dec("33334"), dec("33333"), dec("33333")]);
        assert_eq!(result.total_allocated(), dec("100000"));
        assert!(result.warnings.is_empty());
        assert!(result.is_preview);
    }

    /// DS-002: headcount scenario from the allocation page
    #[test]
    fn test_proportional_by_employee_count() {
        let departments = vec![
            department("a", 10, "0"),
            department("b", 20, "0"),
            department("c", 30, "0"),
        ];
        let result = run("500000", &departments, DistributionStrategy::Proportional);

        assert_eq!(
            amounts(&result),
            vec![dec("83333"), dec("166667"), dec("250000")]
        );
        assert_eq!(result.shares[2].weight, dec("30"));
        assert_eq!(result.audit_step.rule_id, "distribution_proportional");
        assert_eq!(
            result.audit_step.output["absorbing_department"].as_str().unwrap(),
            "c"
        );
    }

    /// DS-003: previous budgets drive the split
    #[test]
    fn test_previous_budget_weights() {
        let departments = vec![department("a", 1, "75000"), department("b", 1, "25000")];
        let result = run("200000", &departments, DistributionStrategy::Previous);

        assert_eq!(amounts(&result), vec![dec("150000"), dec("50000")]);
    }

    /// DS-004: all previous budgets zero falls back to an equal split
    #[test]
    fn test_previous_all_zero_falls_back_to_equal() {
        let departments = vec![department("a", 1, "0"), department("b", 1, "0")];
        let result = run("1001", &departments, DistributionStrategy::Previous);

        assert_eq!(amounts(&result), vec![dec("501"), dec("500")]);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, EQUAL_FALLBACK_WARNING);
        assert_eq!(result.audit_step.output["fallback_to_equal"], true);
    }

    #[test]
    fn test_proportional_all_zero_employees_falls_back_to_equal() {
        let departments = vec![department("a", 0, "0"), department("b", 0, "0")];
        let result = run("10", &departments, DistributionStrategy::Proportional);

        assert_eq!(amounts(&result), vec![dec("5"), dec("5")]);
        assert_eq!(result.warnings[0].code, EQUAL_FALLBACK_WARNING);
    }

    /// DS-005: priority weights, missing departments default to medium
    #[test]
    fn test_priority_weights_with_medium_default() {
        let departments = vec![
            department("a", 1, "0"),
            department("b", 1, "0"),
            department("c", 1, "0"),
        ];
        let mut priorities = HashMap::new();
        priorities.insert("a".to_string(), Priority::Critical);
        priorities.insert("b".to_string(), Priority::Low);

        let result = distribute(
            dec("70000"),
            &departments,
            DistributionStrategy::Priority,
            &priorities,
            &DistributionSettings::default(),
        )
        .unwrap();

        // weights 4 : 1 : 2
        assert_eq!(
            amounts(&result),
            vec![dec("40000"), dec("10000"), dec("20000")]
        );
    }

    /// DS-006: no departments yields an empty distribution with a warning
    #[test]
    fn test_empty_departments_returns_empty_with_warning() {
        let result = run("100000", &[], DistributionStrategy::Equal);

        assert!(result.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, NO_DEPARTMENTS_WARNING);
        assert_eq!(result.total_allocated(), Decimal::ZERO);
    }

    #[test]
    fn test_inactive_departments_are_skipped() {
        let mut inactive = department("old", 100, "100000");
        inactive.status = DepartmentStatus::Inactive;
        let departments = vec![department("a", 10, "0"), inactive];

        let result = run("5000", &departments, DistributionStrategy::Proportional);
        assert_eq!(result.shares.len(), 1);
        assert_eq!(result.amount_for("a"), Some(dec("5000")));
        assert_eq!(result.amount_for("old"), None);
    }

    #[test]
    fn test_only_inactive_departments_warns() {
        let mut inactive = department("old", 1, "0");
        inactive.status = DepartmentStatus::Inactive;

        let result = run("5000", &[inactive], DistributionStrategy::Equal);
        assert!(result.is_empty());
        assert_eq!(result.warnings[0].code, NO_DEPARTMENTS_WARNING);
    }

    #[test]
    fn test_negative_budget_is_rejected() {
        let result = distribute(
            dec("-1"),
            &[department("a", 1, "0")],
            DistributionStrategy::Equal,
            &HashMap::new(),
            &DistributionSettings::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidBudget { .. })));
    }

    #[test]
    fn test_zero_budget_distributes_zeros() {
        let departments = vec![department("a", 3, "0"), department("b", 7, "0")];
        let result = run("0", &departments, DistributionStrategy::Proportional);
        assert!(result.shares.iter().all(|s| s.amount.is_zero()));
    }

    #[test]
    fn test_unit_scale_keeps_cents() {
        let departments = vec![
            department("a", 1, "0"),
            department("b", 1, "0"),
            department("c", 1, "0"),
        ];
        let settings = DistributionSettings {
            unit_scale: 2,
            ..DistributionSettings::default()
        };
        let result = distribute(
            dec("100"),
            &departments,
            DistributionStrategy::Proportional,
            &HashMap::new(),
            &settings,
        )
        .unwrap();

        assert_eq!(amounts(&result), vec![dec("33.34"), dec("33.33"), dec("33.33")]);
    }

    #[test]
    fn test_into_authoritative_clears_preview_flag() {
        let result = run("10", &[department("a", 1, "0")], DistributionStrategy::Equal);
        assert!(!result.into_authoritative().is_preview);
    }

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(
            serde_json::to_string(&DistributionStrategy::Previous).unwrap(),
            "\"previous\""
        );
        let parsed: DistributionStrategy = serde_json::from_str("\"priority\"").unwrap();
        assert_eq!(parsed, DistributionStrategy::Priority);
    }

    #[test]
    fn test_repeated_department_gets_one_share() {
        let departments = vec![
            department("a", 1, "0"),
            department("a", 1, "0"),
            department("b", 1, "0"),
        ];
        let result = run("90", &departments, DistributionStrategy::Equal);

        let ids: Vec<&str> = result.shares.iter().map(|s| s.department_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(amounts(&result), vec![dec("45"), dec("45")]);
        assert_eq!(result.warnings[0].code, DUPLICATE_DEPARTMENT_WARNING);
    }

    #[test]
    fn test_large_previous_budgets_do_not_overflow() {
        let departments = vec![
            department("a", 1, "10000000000"),
            department("b", 1, "1"),
        ];
        let result = run("100000000000000000000", &departments, DistributionStrategy::Previous);

        assert_eq!(result.total_allocated(), dec("100000000000000000000"));
        assert!(result.shares.iter().all(|s| s.amount >= Decimal::ZERO));
    }

    #[test]
    fn test_overflowing_weight_sum_is_invalid_budget() {
        let huge = Decimal::MAX.to_string();
        let departments = vec![department("a", 1, &huge), department("b", 1, &huge)];
        let result = distribute(
            dec("100"),
            &departments,
            DistributionStrategy::Previous,
            &HashMap::new(),
            &DistributionSettings::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidBudget { .. })));
    }

    #[test]
    fn test_budget_finer_than_unit_is_rejected() {
        let departments = vec![department("a", 1, "0"), department("b", 1, "0")];
        let result = distribute(
            dec("100.005"),
            &departments,
            DistributionStrategy::Equal,
            &HashMap::new(),
            &DistributionSettings::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidBudget { .. })));

        // trailing zeros are not extra precision
        let result = run("100.00", &departments, DistributionStrategy::Equal);
        assert_eq!(result.total_allocated(), dec("100"));
    }
}

//! Department model and related types.
//!
//! Departments come from the department registry and are read-only to the
//! allocation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a department currently takes part in budget allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentStatus {
    /// The department receives allocations.
    #[default]
    Active,
    /// The department is retired or on hold.
    Inactive,
}

/// A department that budget can be allocated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier for the department.
    pub id: String,
    /// The human-readable name of the department.
    pub name: String,
    /// Short department code (e.g., "ENG").
    pub code: String,
    /// Name of the department head.
    #[serde(default)]
    pub head: String,
    /// The department's budget in the previous period.
    #[serde(default)]
    pub current_budget: Decimal,
    /// Number of employees in the department.
    #[serde(default)]
    pub employee_count: u32,
    /// Whether the department is active.
    #[serde(default)]
    pub status: DepartmentStatus,
}

impl Department {
    /// Returns true if the department takes part in allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use budget_allocation::models::{Department, DepartmentStatus};
    /// use rust_decimal::Decimal;
    ///
    /// let department = Department {
    ///     id: "dept_eng".to_string(),
    ///     name: "Engineering".to_string(),
    ///     code: "ENG".to_string(),
    ///     head: "A. Rivera".to_string(),
    ///     current_budget: Decimal::new(250_000, 0),
    ///     employee_count: 30,
    ///     status: DepartmentStatus::Active,
    /// };
    /// assert!(department.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        self.status == DepartmentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_department() {
        let json = r#"{
            "id": "dept_ops",
            "name": "Operations",
            "code": "OPS",
            "head": "J. Chen",
            "current_budget": "120000.00",
            "employee_count": 12,
            "status": "active"
        }"#;

        let department: Department = serde_json::from_str(json).unwrap();
        assert_eq!(department.id, "dept_ops");
        assert_eq!(department.code, "OPS");
        assert_eq!(department.current_budget, Decimal::new(12_000_000, 2));
        assert_eq!(department.employee_count, 12);
        assert!(department.is_active());
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let json = r#"{ "id": "dept_new", "name": "New Team", "code": "NEW" }"#;

        let department: Department = serde_json::from_str(json).unwrap();
        assert_eq!(department.head, "");
        assert_eq!(department.current_budget, Decimal::ZERO);
        assert_eq!(department.employee_count, 0);
        assert_eq!(department.status, DepartmentStatus::Active);
    }

    #[test]
    fn test_inactive_department_is_not_active() {
        let json = r#"{ "id": "dept_old", "name": "Legacy", "code": "LEG", "status": "inactive" }"#;

        let department: Department = serde_json::from_str(json).unwrap();
        assert!(!department.is_active());
    }
}

//! Allocation logic for the Budget Allocation Engine.
//!
//! This module contains the pure functions behind budget allocation:
//! rounding-safe apportionment, the four auto-distribution strategies, and
//! validation of a draft against the budget rules.

mod apportion;
mod strategy;
mod validation;

pub use apportion::{apportion, split_equally};
pub use strategy::{
    DUPLICATE_DEPARTMENT_WARNING, DepartmentShare, Distribution, DistributionStrategy,
    EQUAL_FALLBACK_WARNING, NO_DEPARTMENTS_WARNING, distribute,
};
pub use validation::{
    AMOUNT_OUT_OF_RANGE, CONCENTRATION, DUPLICATE_LINE, EXCEEDS_CAP, EXCEEDS_TOTAL,
    NEGATIVE_AMOUNT, NEGATIVE_BUDGET, NO_LINES, OVER_ALLOCATED, UNALLOCATED, validate,
};

//! Interpretation of raw form input for allocation lines.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// An editable field of an allocation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineField {
    /// The allocated amount.
    Amount,
    /// The budget category.
    Category,
    /// The priority.
    Priority,
    /// Free-form notes.
    Notes,
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LineField::Amount => "amount",
            LineField::Category => "category",
            LineField::Priority => "priority",
            LineField::Notes => "notes",
        };
        f.write_str(label)
    }
}

impl FromStr for LineField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "amount" => Ok(LineField::Amount),
            "category" => Ok(LineField::Category),
            "priority" => Ok(LineField::Priority),
            "notes" => Ok(LineField::Notes),
            other => Err(EngineError::InvalidLineValue {
                field: other.to_string(),
                message: "unknown line field".to_string(),
            }),
        }
    }
}

/// Parses a money amount typed by a user.
///
/// Surrounding whitespace, a leading `$` and thousands separators are
/// ignored. Anything that still does not parse becomes zero, so a bad
/// keystroke never poisons the totals.
///
/// # Examples
///
/// ```
/// use budget_allocation::editor::coerce_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(coerce_amount(" $12,500.50 "), Decimal::new(1_250_050, 2));
/// assert_eq!(coerce_amount("abc"), Decimal::ZERO);
/// ```
pub fn coerce_amount(input: &str) -> Decimal {
    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let cleaned: String = unsigned
        .strip_prefix('$')
        .unwrap_or(unsigned)
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    let parsed = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO);

    if negative { -parsed } else { parsed }
}

//! Rounding-safe splitting of a total into parts.
//!
//! Both functions return amounts rounded to the allocation unit whose sum is
//! exactly the input total. Any rounding remainder lands on a single part.
//! Totals with more decimal places than the unit leave that extra precision
//! on the remainder part; `distribute` rejects such totals up front.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

/// Splits `total` into `count` equal parts.
///
/// Every part is truncated to `unit_scale` decimal places and the remainder
/// is added to the first part.
///
/// # Examples
///
/// ```
/// use budget_allocation::allocation::split_equally;
/// use rust_decimal::Decimal;
///
/// let parts = split_equally(Decimal::new(100_000, 0), 3, 0);
/// assert_eq!(parts, vec![Decimal::new(33_334, 0), Decimal::new(33_333, 0), Decimal::new(33_333, 0)]);
/// ```
pub fn split_equally(total: Decimal, count: usize, unit_scale: u32) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }

    let n = Decimal::from(count as u64);
    let base = (total / n).round_dp_with_strategy(unit_scale, RoundingStrategy::ToZero);

    // base * (count - 1) never exceeds total
    let mut parts = vec![base; count];
    parts[0] = total - base * Decimal::from((count - 1) as u64);
    parts
}

/// Splits `total` in proportion to `weights`.
///
/// Each part is rounded half away from zero to `unit_scale` decimal places.
/// The part with the largest weight (the first one on ties) absorbs the
/// rounding drift. When absorbing would push it below zero, the other parts
/// are truncated instead, which can only grow the absorbing part.
///
/// Negative weights count as zero. If every weight is zero the total is
/// split equally.
///
/// # Errors
///
/// - `InvalidBudget` if the weights or the total are too large to combine
///
/// # Examples
///
/// ```
/// use budget_allocation::allocation::apportion;
/// use rust_decimal::Decimal;
///
/// let weights = [Decimal::new(10, 0), Decimal::new(20, 0), Decimal::new(30, 0)];
/// let parts = apportion(Decimal::new(500_000, 0), &weights, 0).unwrap();
/// assert_eq!(parts, vec![Decimal::new(83_333, 0), Decimal::new(166_667, 0), Decimal::new(250_000, 0)]);
/// ```
pub fn apportion(total: Decimal, weights: &[Decimal], unit_scale: u32) -> EngineResult<Vec<Decimal>> {
    let weights: Vec<Decimal> = weights.iter().map(|w| (*w).max(Decimal::ZERO)).collect();
    let weight_sum = checked_sum(&weights).ok_or_else(|| out_of_range("weights"))?;

    if weights.is_empty() {
        return Ok(Vec::new());
    }
    if weight_sum.is_zero() {
        return Ok(split_equally(total, weights.len(), unit_scale));
    }

    let absorber = absorbing_index(&weights);
    // ratio first so the product never exceeds total
    let exact = weights
        .iter()
        .map(|w| {
            w.checked_div(weight_sum)
                .and_then(|ratio| total.checked_mul(ratio))
        })
        .collect::<Option<Vec<Decimal>>>()
        .ok_or_else(|| out_of_range("total budget"))?;

    let rounded = fill_absorber(&exact, absorber, total, |share| {
        share.round_dp_with_strategy(unit_scale, RoundingStrategy::MidpointAwayFromZero)
    });
    if let Some(parts) = rounded {
        if parts[absorber] >= Decimal::ZERO {
            return Ok(parts);
        }
    }

    fill_absorber(&exact, absorber, total, |share| {
        share.round_dp_with_strategy(unit_scale, RoundingStrategy::ToZero)
    })
    .ok_or_else(|| out_of_range("total budget"))
}

/// Sums amounts, returning `None` on overflow.
pub(crate) fn checked_sum(amounts: &[Decimal]) -> Option<Decimal> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))
}

/// Returns the index of the largest weight, first on ties.
pub(crate) fn absorbing_index(weights: &[Decimal]) -> usize {
    weights
        .iter()
        .enumerate()
        .fold(0, |best, (i, w)| if *w > weights[best] { i } else { best })
}

fn fill_absorber<F>(
    exact: &[Decimal],
    absorber: usize,
    total: Decimal,
    round: F,
) -> Option<Vec<Decimal>>
where
    F: Fn(Decimal) -> Decimal,
{
    let mut parts: Vec<Decimal> = exact.iter().map(|share| round(*share)).collect();
    let others = parts
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != absorber)
        .try_fold(Decimal::ZERO, |acc, (_, amount)| acc.checked_add(*amount))?;
    parts[absorber] = total.checked_sub(others)?;
    Some(parts)
}

fn out_of_range(what: &str) -> EngineError {
    EngineError::InvalidBudget {
        message: format!("{} out of range for exact apportionment", what),
    }
}

//! Scalar basket metrics.
//!
//! Basket size treats a column without any usable quantity as a legitimate
//! zero. Basket value divides by the row count and rejects an empty table.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::Serialize;

use crate::{
    coerce::coerce_numeric,
    data::Table,
    error::{AnalyticsError, Result},
};

pub const AVG_BASKET_SIZE: &str = "Avg_Basket_Size";
pub const AVG_BASKET_VALUE: &str = "Avg_Basket_Value";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: f64,
}

/// Mean of the present quantities. Zero when none are present.
pub fn average_basket_size(table: &Table, quantity_col: &str) -> Result<Metric> {
    let coerced = coerce_numeric(table.require_column(quantity_col)?);
    let (total, count) = coerced
        .values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    let value = if count == 0 {
        0.0
    } else {
        round2(total / count as f64)
    };
    Ok(Metric {
        label: AVG_BASKET_SIZE,
        value,
    })
}

/// Sales total over every row, including rows without a usable amount.
pub fn average_basket_value(table: &Table, sales_col: &str) -> Result<Metric> {
    let coerced = coerce_numeric(table.require_column(sales_col)?);
    let transactions = table.row_count();
    if transactions == 0 {
        return Err(AnalyticsError::DivisionByZero);
    }
    let total: f64 = coerced.values.iter().flatten().sum();
    Ok(Metric {
        label: AVG_BASKET_VALUE,
        value: round2(total / transactions as f64),
    })
}

/// Rounds half-to-even at two decimal places.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

//! Best-effort narrowing of [`Value`] cells to numbers and dates.
//!
//! Coercion never fails. Cells that cannot be converted become `None` and are
//! tallied in [`Coerced::failures`]; cells that were already missing stay
//! `None` without counting as failures.

use chrono::NaiveDate;
use log::debug;

use crate::data::{Column, Table, Value, parse_calendar_date};

#[derive(Debug, Clone, PartialEq)]
pub struct Coerced<T> {
    pub values: Vec<Option<T>>,
    pub failures: usize,
}

impl<T> Coerced<T> {
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row).and_then(Option::as_ref)
    }
}

pub(crate) fn numeric_cell(value: &Value) -> Result<Option<f64>, ()> {
    match value {
        Value::Number(n) => Ok(Some(*n)),
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(()),
        },
        Value::Missing => Ok(None),
    }
}

pub(crate) fn date_cell(value: &Value) -> Result<Option<NaiveDate>, ()> {
    match value {
        Value::Text(s) => parse_calendar_date(s).map(Some).ok_or(()),
        Value::Number(_) => Err(()),
        Value::Missing => Ok(None),
    }
}

fn coerce_with<T>(
    column: &Column,
    target: &str,
    convert: impl Fn(&Value) -> Result<Option<T>, ()>,
) -> Coerced<T> {
    let mut failures = 0usize;
    let values = column
        .values
        .iter()
        .map(|cell| {
            convert(cell).unwrap_or_else(|()| {
                failures += 1;
                None
            })
        })
        .collect::<Vec<_>>();
    if failures > 0 {
        debug!(
            "Column '{}': {} value(s) could not be read as {target}",
            column.name, failures
        );
    }
    Coerced { values, failures }
}

pub fn coerce_numeric(column: &Column) -> Coerced<f64> {
    coerce_with(column, "numbers", numeric_cell)
}

pub fn coerce_date(column: &Column) -> Coerced<NaiveDate> {
    coerce_with(column, "dates", date_cell)
}

/// First candidate column (in the order given) with at least one parseable
/// date. Unknown column names are skipped.
pub fn first_parseable_date_column<'a, I>(table: &Table, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().find_map(|name| {
        let column = table.column(name)?;
        let coerced = coerce_date(column);
        (coerced.valid_count() > 0).then(|| name.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(cells: &[&str]) -> Column {
        Column::new("c", cells.iter().map(|c| Value::from_field(c)).collect())
    }

    #[test]
    fn numeric_coercion_counts_only_present_failures() {
        let coerced = coerce_numeric(&column(&["1", "", "x", "2.5", "n/a"]));
        assert_eq!(
            coerced.values,
            vec![Some(1.0), None, None, Some(2.5), None]
        );
        assert_eq!(coerced.failures, 2);
        assert_eq!(coerced.valid_count(), 2);
    }

    #[test]
    fn date_coercion_rejects_numbers() {
        let coerced = coerce_date(&column(&["2024-01-05", "17", "", "garbage"]));
        assert_eq!(coerced.valid_count(), 1);
        assert_eq!(coerced.failures, 2);
        assert_eq!(
            coerced.get(0),
            Some(&NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
    }

    #[test]
    fn short_year_dates_coerce_to_real_dates_or_fail() {
        let coerced = coerce_date(&column(&["2/3/24", "13/13/23", "1/15/23"]));
        assert_eq!(coerced.failures, 1);
        assert_eq!(coerced.get(0), NaiveDate::from_ymd_opt(2024, 2, 3).as_ref());
        assert_eq!(coerced.get(1), None);
        assert_eq!(coerced.get(2), NaiveDate::from_ymd_opt(2023, 1, 15).as_ref());
    }

    #[test]
    fn first_parseable_date_column_skips_unparseable_candidates() {
        let table = Table::new(vec![
            Column::new("order_id", vec![Value::from("A-1"), Value::from("A-2")]),
            Column::new("order_date", vec![Value::from("2023-01-01"), Value::Missing]),
            Column::new("sale_date", vec![Value::from("2023-02-01"), Value::Missing]),
        ])
        .unwrap();
        let chosen =
            first_parseable_date_column(&table, ["missing", "order_id", "order_date", "sale_date"]);
        assert_eq!(chosen.as_deref(), Some("order_date"));
    }

    #[test]
    fn first_parseable_date_column_is_none_without_dates() {
        let table = Table::new(vec![Column::new("order", vec![Value::from("x")])]).unwrap();
        assert_eq!(first_parseable_date_column(&table, ["order"]), None);
    }
}

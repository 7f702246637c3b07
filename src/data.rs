use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::AnalyticsError;

/// A single cell of an ingested dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Classifies a raw field the way a delimited-file reader sees it: blank
    /// fields are missing, anything that parses as a float is a number.
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Value::Number(number),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Missing => String::new(),
        }
    }

    /// Key used when a cell acts as a grouping label. Missing cells have no key.
    pub fn group_key(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            other => Some(other.as_display()),
        }
    }

    /// Hashable identity used for distinct counting. `1` and `1.0` collapse to
    /// the same number; a number and the text `"1"` stay distinct.
    pub(crate) fn distinct_key(&self) -> DistinctKey {
        match self {
            Value::Number(n) if *n == 0.0 => DistinctKey::Number(0),
            Value::Number(n) => DistinctKey::Number(n.to_bits()),
            Value::Text(s) => DistinctKey::Text(s.clone()),
            Value::Missing => DistinctKey::Missing,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Missing, Into::into)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum DistinctKey {
    Number(u64),
    Text(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Named columns of equal length. Never mutated by the analytics layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, AnalyticsError> {
        let row_count = columns.first().map_or(0, |c| c.values.len());
        if let Some(ragged) = columns.iter().find(|c| c.values.len() != row_count) {
            return Err(AnalyticsError::RaggedTable {
                column: ragged.name.clone(),
                expected: row_count,
                actual: ragged.values.len(),
            });
        }
        Ok(Self { columns, row_count })
    }

    /// Builds a table from header names and row-major records. Short rows are
    /// padded with missing cells, surplus cells are ignored.
    pub fn from_rows(headers: &[String], rows: Vec<Vec<Value>>) -> Self {
        let mut columns = headers
            .iter()
            .map(|name| Column::new(name.clone(), Vec::with_capacity(rows.len())))
            .collect::<Vec<_>>();
        let row_count = rows.len();
        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.values.push(cells.next().unwrap_or(Value::Missing));
            }
        }
        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<&Column, AnalyticsError> {
        self.column(name)
            .ok_or_else(|| AnalyticsError::ColumnNotFound(name.to_string()))
    }
}

// Four-digit-year layouts are tried before their two-digit counterparts, and
// month-first before day-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%y",
    "%d-%m-%y",
    "%d.%m.%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%y %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%d/%m/%y %H:%M",
];

/// chrono's `%Y` reads one to four digits, so `2/3/24` would otherwise match
/// `%Y/%m/%d` as year 2. Years below 1000 never come from a four-digit field.
fn has_full_year<T: Datelike>(parsed: &T) -> bool {
    parsed.year() >= 1000
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            .filter(has_full_year)
    })
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .filter(has_full_year)
    })
}

/// Calendar date of a date or datetime string, if it has one.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_naive_date(trimmed).or_else(|| parse_naive_datetime(trimmed).map(|dt| dt.date()))
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_field_classifies_cells() {
        assert_eq!(Value::from_field("  "), Value::Missing);
        assert_eq!(Value::from_field("42"), Value::Number(42.0));
        assert_eq!(Value::from_field(" 3.5 "), Value::Number(3.5));
        assert_eq!(Value::from_field("Shoes"), Value::Text("Shoes".to_string()));
        assert_eq!(Value::from_field("NaN"), Value::Text("NaN".to_string()));
    }

    #[test]
    fn parse_calendar_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_calendar_date("2024-05-06"), Some(expected));
        assert_eq!(parse_calendar_date("05/06/2024"), Some(expected));
        assert_eq!(parse_calendar_date("2024/05/06"), Some(expected));
        assert_eq!(parse_calendar_date("2024-05-06 14:30:00"), Some(expected));
        assert_eq!(parse_calendar_date("2024-05-06T14:30:00Z"), Some(expected));
        assert_eq!(parse_calendar_date("May 06, 2024"), Some(expected));
        assert_eq!(parse_calendar_date("not a date"), None);
    }

    #[test]
    fn two_digit_years_land_in_the_current_century() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        assert_eq!(parse_calendar_date("2/3/24"), date(2024, 2, 3));
        assert_eq!(parse_calendar_date("1/15/23"), date(2023, 1, 15));
        assert_eq!(parse_calendar_date("01-02-23"), date(2023, 1, 2));
        assert_eq!(parse_calendar_date("15-01-23"), date(2023, 1, 15));
        assert_eq!(parse_calendar_date("31.12.99"), date(1999, 12, 31));
        assert_eq!(parse_calendar_date("2/3/24 09:15"), date(2024, 2, 3));
    }

    #[test]
    fn short_years_never_parse_as_ancient_dates() {
        for raw in ["2/3/24", "1/15/23", "15-01-23", "01-02-23", "24/2/3"] {
            if let Some(parsed) = parse_calendar_date(raw) {
                assert!(parsed.year() >= 1000, "{raw} parsed as {parsed}");
            }
        }
        assert_eq!(parse_calendar_date("13/13/23"), None);
        assert_eq!(parse_naive_datetime("1/2/3 10:00"), None);
    }

    #[test]
    fn slash_dates_fall_back_to_day_first() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 25).unwrap();
        assert_eq!(parse_calendar_date("25/05/2024"), Some(expected));
    }

    #[test]
    fn table_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("a", vec![Value::from(1.0), Value::from(2.0)]),
            Column::new("b", vec![Value::from(1.0)]),
        ])
        .expect_err("ragged table");
        assert!(matches!(err, AnalyticsError::RaggedTable { actual: 1, .. }));
    }

    #[test]
    fn from_rows_pads_short_records() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let table = Table::from_rows(&headers, vec![vec![Value::from(1.0)]]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column("b").unwrap().values, vec![Value::Missing]);
    }

    #[test]
    fn distinct_key_collapses_signed_zero() {
        assert_eq!(
            Value::Number(0.0).distinct_key(),
            Value::Number(-0.0).distinct_key()
        );
        assert_ne!(
            Value::Number(1.0).distinct_key(),
            Value::Text("1".to_string()).distinct_key()
        );
    }
}

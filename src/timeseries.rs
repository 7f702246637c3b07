//! Date-bucketed sales aggregation.
//!
//! Every aggregation coerces the date column afresh and drops rows whose date
//! does not parse; the source table is left untouched. When no row survives,
//! the result is [`SeriesOutcome::NoValidData`].

use std::fmt;

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Serialize, Serializer};

use crate::{
    aggregate::{AggregateTable, GroupedSums, PeakRecord, SeriesOutcome, stable_argmax},
    coerce::{Coerced, coerce_date, coerce_numeric},
    config::MonthCalendar,
    data::Table,
    error::Result,
};

/// Calendar month bucket. Orders chronologically and prints as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub months: AggregateTable<YearMonth>,
    pub peak: PeakRecord<YearMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub month: YearMonth,
    pub category: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// Chronological months; categories in first-seen order within a month.
    pub rows: Vec<CategorySales>,
    /// Best-selling category of each month.
    pub peaks: Vec<CategorySales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarTotals {
    pub by_year: AggregateTable<i32>,
    pub by_month_name: AggregateTable<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakPeriod {
    pub year: i32,
    pub month_name: String,
    pub sales: f64,
}

/// Dates and sales amounts for the rows of `table`, coerced side by side.
struct DatedSales {
    dates: Coerced<NaiveDate>,
    sales: Coerced<f64>,
}

impl DatedSales {
    fn load(table: &Table, date_col: &str, sales_col: &str) -> Result<Self> {
        let dates = coerce_date(table.require_column(date_col)?);
        let sales = coerce_numeric(table.require_column(sales_col)?);
        debug!(
            "{} of {} row(s) carry a usable '{date_col}' date",
            dates.valid_count(),
            table.row_count()
        );
        Ok(Self { dates, sales })
    }

    fn has_dates(&self) -> bool {
        self.dates.valid_count() > 0
    }

    /// Rows with a valid date. Missing amounts read as zero.
    fn dated(&self) -> impl Iterator<Item = (usize, NaiveDate, f64)> + '_ {
        self.dates
            .values
            .iter()
            .enumerate()
            .filter_map(move |(row, date)| {
                let date = (*date)?;
                Some((row, date, self.sales.get(row).copied().unwrap_or(0.0)))
            })
    }

    /// Rows with both a valid date and a present amount.
    fn complete(&self) -> impl Iterator<Item = (usize, NaiveDate, f64)> + '_ {
        self.dates
            .values
            .iter()
            .zip(&self.sales.values)
            .enumerate()
            .filter_map(|(row, (date, sales))| Some((row, (*date)?, (*sales)?)))
    }

    fn monthly_sums(&self) -> AggregateTable<YearMonth> {
        let mut sums = GroupedSums::new();
        for (_, date, sales) in self.dated() {
            sums.add(YearMonth::of(date), sales);
        }
        sums.into_sorted_table()
    }
}

/// Sales per calendar month in chronological order, with the peak month.
pub fn monthly_trend(
    table: &Table,
    date_col: &str,
    sales_col: &str,
) -> Result<SeriesOutcome<MonthlyTrend>> {
    let data = DatedSales::load(table, date_col, sales_col)?;
    let mut sums = GroupedSums::new();
    for (_, date, sales) in data.complete() {
        sums.add(YearMonth::of(date), sales);
    }
    let months = sums.into_sorted_table();
    Ok(match months.peak() {
        Some(peak) => SeriesOutcome::Ready(MonthlyTrend { months, peak }),
        None => SeriesOutcome::NoValidData,
    })
}

/// Sales per (month, category) and the top category of each month.
pub fn monthly_sales_by_category(
    table: &Table,
    date_col: &str,
    category_col: &str,
    sales_col: &str,
) -> Result<SeriesOutcome<CategoryBreakdown>> {
    let data = DatedSales::load(table, date_col, sales_col)?;
    let categories = table.require_column(category_col)?;
    let mut sums = GroupedSums::new();
    for (row, date, sales) in data.complete() {
        if let Some(category) = categories.values[row].group_key() {
            sums.add((YearMonth::of(date), category), sales);
        }
    }
    if sums.is_empty() {
        return Ok(SeriesOutcome::NoValidData);
    }

    // Stable sort keeps first-seen category order inside each month.
    let mut rows = sums
        .into_table()
        .iter()
        .map(|row| CategorySales {
            month: row.key.0,
            category: row.key.1.clone(),
            sales: row.measure,
        })
        .collect::<Vec<_>>();
    rows.sort_by_key(|row| row.month);

    let peaks = rows
        .chunk_by(|a, b| a.month == b.month)
        .filter_map(|month_rows| {
            let best = stable_argmax(month_rows.iter().map(|row| row.sales))?;
            Some(month_rows[best].clone())
        })
        .collect();
    Ok(SeriesOutcome::Ready(CategoryBreakdown { rows, peaks }))
}

/// Sales per calendar year, ascending.
pub fn yearly_totals(
    table: &Table,
    date_col: &str,
    sales_col: &str,
) -> Result<SeriesOutcome<AggregateTable<i32>>> {
    let data = DatedSales::load(table, date_col, sales_col)?;
    if !data.has_dates() {
        return Ok(SeriesOutcome::NoValidData);
    }
    Ok(SeriesOutcome::Ready(year_sums(&data)))
}

/// Sales per month name across all years, in calendar order. Months without
/// any dated row are omitted.
pub fn month_name_totals(
    table: &Table,
    date_col: &str,
    sales_col: &str,
    calendar: &MonthCalendar,
) -> Result<SeriesOutcome<AggregateTable<String>>> {
    let data = DatedSales::load(table, date_col, sales_col)?;
    if !data.has_dates() {
        return Ok(SeriesOutcome::NoValidData);
    }
    Ok(SeriesOutcome::Ready(month_name_sums(&data, calendar)))
}

/// Yearly and month-name totals from a single coercion pass.
pub fn sales_by_year_and_month(
    table: &Table,
    date_col: &str,
    sales_col: &str,
    calendar: &MonthCalendar,
) -> Result<SeriesOutcome<CalendarTotals>> {
    let data = DatedSales::load(table, date_col, sales_col)?;
    if !data.has_dates() {
        return Ok(SeriesOutcome::NoValidData);
    }
    Ok(SeriesOutcome::Ready(CalendarTotals {
        by_year: year_sums(&data),
        by_month_name: month_name_sums(&data, calendar),
    }))
}

/// Month with the highest sales, reported as year and month name.
pub fn highest_sales_period(
    table: &Table,
    date_col: &str,
    sales_col: &str,
    calendar: &MonthCalendar,
) -> Result<SeriesOutcome<PeakPeriod>> {
    let data = DatedSales::load(table, date_col, sales_col)?;
    let Some(peak) = data.monthly_sums().peak() else {
        return Ok(SeriesOutcome::NoValidData);
    };
    Ok(SeriesOutcome::Ready(peak_period(&peak, calendar)))
}

/// Splits a peak month into its year and calendar month name.
pub fn peak_period(peak: &PeakRecord<YearMonth>, calendar: &MonthCalendar) -> PeakPeriod {
    let YearMonth { year, month } = peak.key;
    let month_name = calendar
        .name(month)
        .map_or_else(|| format!("{month:02}"), str::to_string);
    PeakPeriod {
        year,
        month_name,
        sales: peak.measure,
    }
}

fn year_sums(data: &DatedSales) -> AggregateTable<i32> {
    let mut sums = GroupedSums::new();
    for (_, date, sales) in data.dated() {
        sums.add(date.year(), sales);
    }
    sums.into_sorted_table()
}

fn month_name_sums(data: &DatedSales, calendar: &MonthCalendar) -> AggregateTable<String> {
    let mut sums = GroupedSums::new();
    for (_, date, sales) in data.dated() {
        sums.add(date.month(), sales);
    }
    sums.into_sorted_table()
        .iter()
        .filter_map(|row| Some((calendar.name(row.key)?.to_string(), row.measure)))
        .collect()
}

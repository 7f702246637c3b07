//! Role-driven analysis of a whole dataset.
//!
//! [`SalesAnalysis`] extracts features and resolves roles once, then exposes
//! each metric and aggregation keyed by role instead of column name. A
//! [`SalesReport`] runs all of them and records the sections that could not
//! be computed as warnings, so a dataset missing one signal still yields the
//! rest.

use log::warn;
use serde::Serialize;

use crate::{
    aggregate::SeriesOutcome,
    config::AnalyticsConfig,
    data::Table,
    error::Result,
    features::{ColumnFeature, extract_features},
    grouping::{self, TopEntry},
    metrics::{self, Metric},
    roles::{Role, RoleMap, resolve_roles},
    timeseries::{self, CalendarTotals, CategoryBreakdown, MonthlyTrend, PeakPeriod},
};

pub struct SalesAnalysis<'a> {
    table: &'a Table,
    config: &'a AnalyticsConfig,
    features: Vec<ColumnFeature>,
    roles: RoleMap,
}

impl<'a> SalesAnalysis<'a> {
    pub fn new(table: &'a Table, config: &'a AnalyticsConfig) -> Self {
        let features = extract_features(table, config);
        let roles = resolve_roles(table, &features);
        Self {
            table,
            config,
            features,
            roles,
        }
    }

    pub fn table(&self) -> &Table {
        self.table
    }

    pub fn features(&self) -> &[ColumnFeature] {
        &self.features
    }

    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }

    pub fn basket_size(&self) -> Result<Metric> {
        metrics::average_basket_size(self.table, self.roles.require(Role::Quantity)?)
    }

    pub fn basket_value(&self) -> Result<Metric> {
        metrics::average_basket_value(self.table, self.roles.require(Role::Sales)?)
    }

    pub fn monthly_trend(&self) -> Result<SeriesOutcome<MonthlyTrend>> {
        timeseries::monthly_trend(
            self.table,
            self.roles.require(Role::Date)?,
            self.roles.require(Role::Sales)?,
        )
    }

    pub fn category_sales(&self) -> Result<SeriesOutcome<CategoryBreakdown>> {
        timeseries::monthly_sales_by_category(
            self.table,
            self.roles.require(Role::Date)?,
            self.roles.require(Role::Product)?,
            self.roles.require(Role::Sales)?,
        )
    }

    pub fn calendar_totals(&self) -> Result<SeriesOutcome<CalendarTotals>> {
        timeseries::sales_by_year_and_month(
            self.table,
            self.roles.require(Role::Date)?,
            self.roles.require(Role::Sales)?,
            &self.config.calendar,
        )
    }

    pub fn peak_period(&self) -> Result<SeriesOutcome<PeakPeriod>> {
        timeseries::highest_sales_period(
            self.table,
            self.roles.require(Role::Date)?,
            self.roles.require(Role::Sales)?,
            &self.config.calendar,
        )
    }

    pub fn top_products_by_gender(&self) -> Result<Vec<TopEntry>> {
        grouping::top_product_by_gender(self.table, &self.roles)
    }

    pub fn report(&self) -> SalesReport {
        let mut sections = Sections::default();
        SalesReport {
            rows: self.table.row_count(),
            features: self.features.clone(),
            roles: self.roles.clone(),
            basket_size: sections.keep("basket size", self.basket_size()),
            basket_value: sections.keep("basket value", self.basket_value()),
            monthly_trend: sections.keep("monthly trend", self.monthly_trend()),
            category_sales: sections.keep("category sales", self.category_sales()),
            calendar_totals: sections.keep("calendar totals", self.calendar_totals()),
            peak_period: sections.keep("peak period", self.peak_period()),
            top_products_by_gender: sections
                .keep("top products by gender", self.top_products_by_gender()),
            warnings: sections.warnings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub rows: usize,
    pub features: Vec<ColumnFeature>,
    pub roles: RoleMap,
    pub basket_size: Option<Metric>,
    pub basket_value: Option<Metric>,
    pub monthly_trend: Option<SeriesOutcome<MonthlyTrend>>,
    pub category_sales: Option<SeriesOutcome<CategoryBreakdown>>,
    pub calendar_totals: Option<SeriesOutcome<CalendarTotals>>,
    pub peak_period: Option<SeriesOutcome<PeakPeriod>>,
    pub top_products_by_gender: Option<Vec<TopEntry>>,
    pub warnings: Vec<String>,
}

impl SalesReport {
    pub fn build(table: &Table, config: &AnalyticsConfig) -> Self {
        SalesAnalysis::new(table, config).report()
    }
}

#[derive(Default)]
struct Sections {
    warnings: Vec<String>,
}

impl Sections {
    fn keep<T>(&mut self, name: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                warn!("Skipping {name} [{}]: {error}", error.error_code());
                self.warnings.push(format!("{name}: {error}"));
                None
            }
        }
    }
}

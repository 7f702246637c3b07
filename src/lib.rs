pub mod aggregate;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod grouping;
pub mod io_utils;
pub mod metrics;
pub mod report;
pub mod roles;
pub mod table;
pub mod timeseries;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, info, warn};

use crate::{
    aggregate::SeriesOutcome,
    cli::{Cli, Commands, InputArgs, ReportArgs, TopArgs},
    config::AnalyticsConfig,
    data::Table,
    grouping::TopEntry,
    metrics::Metric,
    report::SalesAnalysis,
    roles::Role,
    table::{TextTable, format_measure},
    timeseries::{CalendarTotals, CategoryBreakdown, MonthlyTrend, PeakPeriod},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_profiler", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Features(args) => handle_features(&args),
        Commands::Roles(args) => handle_roles(&args),
        Commands::Metrics(args) => handle_metrics(&args),
        Commands::Trend(args) => handle_trend(&args),
        Commands::Category(args) => handle_category(&args),
        Commands::Calendar(args) => handle_calendar(&args),
        Commands::Peak(args) => handle_peak(&args),
        Commands::Top(args) => handle_top(&args),
        Commands::Report(args) => handle_report(&args),
    }
}

fn load_inputs(args: &InputArgs) -> Result<(Table, AnalyticsConfig)> {
    let config = match &args.keywords {
        Some(path) => AnalyticsConfig::load(path)
            .with_context(|| format!("Loading keyword overrides from {path:?}"))?,
        None => AnalyticsConfig::default(),
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let table = io_utils::load_table(&args.input, args.delimiter, encoding)?;
    Ok((table, config))
}

fn handle_features(args: &InputArgs) -> Result<()> {
    let (table, config) = load_inputs(args)?;
    let analysis = SalesAnalysis::new(&table, &config);
    features_table(&analysis).print();
    info!("Extracted features for {} column(s)", analysis.features().len());
    Ok(())
}

fn handle_roles(args: &InputArgs) -> Result<()> {
    let (table, config) = load_inputs(args)?;
    let analysis = SalesAnalysis::new(&table, &config);
    roles_table(&analysis).print();
    let unresolved = analysis.roles().unresolved();
    if !unresolved.is_empty() {
        warn!("Unresolved role(s): {}", unresolved.iter().join(", "));
    }
    Ok(())
}

fn handle_metrics(args: &InputArgs) -> Result<()> {
    let (table, config) = load_inputs(args)?;
    let analysis = SalesAnalysis::new(&table, &config);
    let size = analysis
        .basket_size()
        .context("Computing average basket size")?;
    let value = analysis
        .basket_value()
        .context("Computing average basket value")?;
    metrics_table(&[size, value]).print();
    Ok(())
}

fn handle_trend(args: &InputArgs) -> Result<()> {
    let (table, config) = load_inputs(args)?;
    let analysis = SalesAnalysis::new(&table, &config);
    match analysis.monthly_trend().context("Computing monthly trend")? {
        SeriesOutcome::Ready(trend) => print_trend(&trend),
        SeriesOutcome::NoValidData => warn!("No sales data available to analyze"),
    }
    Ok(())
}

fn handle_category(args: &InputArgs) -> Result<()> {
    let (table, config) = load_inputs(args)?;
    let analysis = SalesAnalysis::new(&table, &config);
    match analysis
        .category_sales()
        .context("Computing monthly sales by category")?
    {
        SeriesOutcome::Ready(breakdown) => print_categories(&breakdown),
        SeriesOutcome::NoValidData => {
            warn!("No valid sales data available for category analysis")
        }
    }
    Ok(())
}

fn handle_calendar(args: &InputArgs) -> Result<()> {
    let (table, config) = load_inputs(args)?;
    let analysis = SalesAnalysis::new(&table, &config);
    match analysis
        .calendar_totals()
        .context("Computing yearly and month-name totals")?
    {
        SeriesOutcome::Ready(totals) => print_calendar(&totals),
        SeriesOutcome::NoValidData => warn!("No dated rows available for calendar totals"),
    }
    Ok(())
}

fn handle_peak(args: &InputArgs) -> Result<()> {
    let (table, config) = load_inputs(args)?;
    let analysis = SalesAnalysis::new(&table, &config);
    match analysis.peak_period().context("Finding peak sales period")? {
        SeriesOutcome::Ready(peak) => print_peak(&peak),
        SeriesOutcome::NoValidData => warn!("No dated rows available for peak detection"),
    }
    Ok(())
}

fn handle_top(args: &TopArgs) -> Result<()> {
    let (table, config) = load_inputs(&args.input)?;
    let analysis = SalesAnalysis::new(&table, &config);
    let roles = analysis.roles();
    let group = match &args.group {
        Some(name) => name.as_str(),
        None => roles.require(Role::Gender)?,
    };
    let value = match &args.value {
        Some(name) => name.as_str(),
        None => roles.require(Role::Product)?,
    };
    let measure = if args.count {
        None
    } else {
        args.measure.as_deref().or_else(|| roles.get(Role::Quantity))
    };
    let entries = grouping::top_entry_per_group(&table, group, value, measure)
        .with_context(|| format!("Ranking '{value}' within '{group}'"))?;
    top_table(group, value, &entries).print();
    info!(
        "Ranked '{value}' for {} group(s) of '{group}' by {}",
        entries.len(),
        measure.map_or_else(|| "occurrences".to_string(), |m| format!("'{m}'"))
    );
    Ok(())
}

fn handle_report(args: &ReportArgs) -> Result<()> {
    let (table, config) = load_inputs(&args.input)?;
    let analysis = SalesAnalysis::new(&table, &config);
    let report = analysis.report();
    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Serializing report as JSON")?;
        println!("{rendered}");
        return Ok(());
    }
    roles_table(&analysis).print();
    println!();
    let metrics = [&report.basket_size, &report.basket_value]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>();
    metrics_table(&metrics).print();
    if let Some(SeriesOutcome::Ready(trend)) = &report.monthly_trend {
        println!();
        print_trend(trend);
    }
    if let Some(SeriesOutcome::Ready(breakdown)) = &report.category_sales {
        println!();
        print_categories(breakdown);
    }
    if let Some(SeriesOutcome::Ready(totals)) = &report.calendar_totals {
        println!();
        print_calendar(totals);
    }
    if let Some(SeriesOutcome::Ready(peak)) = &report.peak_period {
        println!();
        print_peak(peak);
    }
    if let (Some(entries), Some(group), Some(value)) = (
        &report.top_products_by_gender,
        report.roles.get(Role::Gender),
        report.roles.get(Role::Product),
    ) {
        println!();
        top_table(group, value, entries).print();
    }
    info!(
        "Report covered {} row(s) with {} skipped section(s)",
        report.rows,
        report.warnings.len()
    );
    Ok(())
}

fn features_table(analysis: &SalesAnalysis<'_>) -> TextTable {
    let mut table = TextTable::new([
        "column", "type", "sample", "mean", "unique", "quantity", "sales", "product", "date",
        "gender", "label",
    ]);
    for feature in analysis.features() {
        let flags = feature.keyword_flags;
        table.push([
            feature.name.clone(),
            feature.declared_type.as_str().to_string(),
            feature.sample_value.clone().unwrap_or_default(),
            feature.mean_value.map(format_measure).unwrap_or_default(),
            feature.unique_count.to_string(),
            flag(flags.quantity),
            flag(flags.sales),
            flag(flags.product),
            flag(flags.date),
            flag(flags.gender),
            feature.inferred_label.as_str().to_string(),
        ]);
    }
    table
}

fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

fn roles_table(analysis: &SalesAnalysis<'_>) -> TextTable {
    let mut table = TextTable::new(["role", "column"]);
    for (role, column) in analysis.roles().iter() {
        table.push([role.to_string(), column.unwrap_or("<unresolved>").to_string()]);
    }
    table
}

fn metrics_table(metrics: &[Metric]) -> TextTable {
    let mut table = TextTable::new(["metric", "value"]);
    for metric in metrics {
        table.push([metric.label.to_string(), format_measure(metric.value)]);
    }
    table
}

fn print_trend(trend: &MonthlyTrend) {
    let mut table = TextTable::new(["month", "sales"]);
    for row in trend.months.iter() {
        table.push([row.key.to_string(), format_measure(row.measure)]);
    }
    table.print();
    println!(
        "Peak month: {}, sales: {}",
        trend.peak.key,
        format_measure(trend.peak.measure)
    );
}

fn print_categories(breakdown: &CategoryBreakdown) {
    let mut table = TextTable::new(["month", "category", "sales"]);
    for row in &breakdown.rows {
        table.push([
            row.month.to_string(),
            row.category.clone(),
            format_measure(row.sales),
        ]);
    }
    table.print();
    println!();
    let mut peaks = TextTable::new(["month", "top_category", "sales"]);
    for row in &breakdown.peaks {
        peaks.push([
            row.month.to_string(),
            row.category.clone(),
            format_measure(row.sales),
        ]);
    }
    peaks.print();
}

fn print_calendar(totals: &CalendarTotals) {
    let mut years = TextTable::new(["year", "sales"]);
    for row in totals.by_year.iter() {
        years.push([row.key.to_string(), format_measure(row.measure)]);
    }
    years.print();
    println!();
    let mut months = TextTable::new(["month", "sales"]);
    for row in totals.by_month_name.iter() {
        months.push([row.key.clone(), format_measure(row.measure)]);
    }
    months.print();
}

fn print_peak(peak: &PeakPeriod) {
    println!(
        "Highest sales recorded: {} {} -> {}",
        peak.month_name,
        peak.year,
        format_measure(peak.sales)
    );
}

fn top_table(group: &str, value: &str, entries: &[TopEntry]) -> TextTable {
    let mut table = TextTable::new([group, value, "measure"]);
    for entry in entries {
        table.push([
            entry.group.clone(),
            entry.value.clone(),
            format_measure(entry.measure),
        ]);
    }
    table
}

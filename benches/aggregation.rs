use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use encoding_rs::UTF_8;
use sales_profiler::config::AnalyticsConfig;
use sales_profiler::data::Table;
use sales_profiler::io_utils;
use sales_profiler::report::SalesReport;
use sales_profiler::timeseries;
use tempfile::TempDir;

fn generate_sales(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("sales.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(
        file,
        "Transaction ID,Date,Gender,Product Category,Quantity,Total Amount"
    )
    .expect("header");
    for i in 0..rows {
        let gender = if i % 2 == 0 { "Male" } else { "Female" };
        let category = match i % 3 {
            0 => "Beauty",
            1 => "Clothing",
            _ => "Electronics",
        };
        let year = 2022 + (i % 3);
        let month = (i % 12) + 1;
        let day = (i % 28) + 1;
        let quantity = (i % 4) + 1;
        let amount = quantity * 25;
        writeln!(
            file,
            "{i},{year}-{month:02}-{day:02},{gender},{category},{quantity},{amount}"
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn load(csv_path: &Path) -> Table {
    io_utils::load_table(csv_path, None, UTF_8).expect("load sales")
}

fn bench_aggregation(c: &mut Criterion) {
    let (temp_dir, csv_path) = generate_sales(50_000);
    let table = load(&csv_path);
    let config = AnalyticsConfig::default();

    let mut group = c.benchmark_group("sales_aggregation");

    group.bench_function("load_table", |b| {
        b.iter_batched(|| (), |_| load(&csv_path), BatchSize::SmallInput);
    });

    group.bench_function("monthly_trend", |b| {
        b.iter(|| {
            timeseries::monthly_trend(&table, "Date", "Total Amount").expect("monthly trend")
        });
    });

    group.bench_function("full_report", |b| {
        b.iter(|| SalesReport::build(&table, &config));
    });

    drop(temp_dir);
    group.finish();
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);

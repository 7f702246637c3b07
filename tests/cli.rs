mod common;

use assert_cmd::Command;
use predicates::{prelude::*, str::contains};

use common::{SALES_CSV, TestWorkspace};

fn profiler() -> Command {
    Command::cargo_bin("sales-profiler").expect("binary exists")
}

fn sales_file(workspace: &TestWorkspace) -> String {
    workspace
        .write("sales.csv", SALES_CSV)
        .to_str()
        .expect("utf-8 path")
        .to_string()
}

#[test]
fn features_lists_every_column() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    profiler()
        .args(["features", "-i", &input])
        .assert()
        .success()
        .stdout(contains("Transaction ID"))
        .stdout(contains("Total Amount"))
        .stdout(contains("not_quantity"))
        .stdout(contains("quantity"));
}

#[test]
fn roles_prints_resolved_columns() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    profiler()
        .args(["roles", "-i", &input])
        .assert()
        .success()
        .stdout(contains("Product Category"))
        .stdout(contains("Price per Unit"))
        .stdout(contains("<unresolved>").not());
}

#[test]
fn metrics_reports_basket_size_and_value() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    profiler()
        .args(["metrics", "-i", &input])
        .assert()
        .success()
        .stdout(contains("Avg_Basket_Size"))
        .stdout(contains("Avg_Basket_Value"))
        .stdout(contains("151.25"));
}

#[test]
fn keyword_override_changes_sales_column() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    let keywords = workspace.write("keywords.yaml", "keywords:\n  sales: [total]\n");
    profiler()
        .args([
            "metrics",
            "-i",
            &input,
            "--keywords",
            keywords.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("245"));
}

#[test]
fn invalid_keyword_file_fails() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    let keywords = workspace.write("keywords.yaml", "months: [January]\n");
    profiler()
        .args([
            "roles",
            "-i",
            &input,
            "--keywords",
            keywords.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("keyword overrides"));
}

#[test]
fn trend_prints_months_and_peak() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    profiler()
        .args(["trend", "-i", &input])
        .assert()
        .success()
        .stdout(contains("2023-01"))
        .stdout(contains("2024-01"))
        .stdout(contains("Peak month: 2023-02, sales: 1025"));
}

#[test]
fn peak_reads_from_stdin() {
    profiler()
        .args(["peak", "-i", "-"])
        .write_stdin(SALES_CSV)
        .assert()
        .success()
        .stdout(contains("Highest sales recorded: February 2023 -> 1025"));
}

#[test]
fn calendar_and_category_commands_succeed() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    profiler()
        .args(["calendar", "-i", &input])
        .assert()
        .success()
        .stdout(contains("2023"))
        .stdout(contains("February"));
    profiler()
        .args(["category", "-i", &input])
        .assert()
        .success()
        .stdout(contains("top_category"))
        .stdout(contains("Clothing"));
}

#[test]
fn trend_without_sales_amounts_warns_instead_of_failing() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("unpriced.csv", "Order Date,Sales\n2023-01-01,\n2023-02-01,n/a\n");
    profiler()
        .args(["trend", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stderr(contains("No sales data available to analyze"));
}

#[test]
fn trend_without_parseable_dates_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("undated.csv", "Order Date,Sales\nsoon,10\nlater,20\n");
    profiler()
        .args(["trend", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("No column found for the 'date' role"));
}

#[test]
fn top_defaults_to_product_per_gender() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    profiler()
        .args(["top", "-i", &input])
        .assert()
        .success()
        .stdout(contains("Male"))
        .stdout(contains("Beauty"))
        .stdout(contains("Electronics"));
}

#[test]
fn top_accepts_explicit_columns() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "stores.tsv",
        "region\titem\nNorth\tLamp\nNorth\tDesk\nNorth\tDesk\nSouth\tLamp\n",
    );
    profiler()
        .args([
            "top",
            "-i",
            input.to_str().unwrap(),
            "--group",
            "region",
            "--value",
            "item",
            "--count",
        ])
        .assert()
        .success()
        .stdout(contains("Desk"))
        .stdout(contains("South"));
}

#[test]
fn top_without_gender_column_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "orders.csv",
        "Order Date,Product,Quantity,Sales\n2023-01-01,Bag,2,20\n",
    );
    profiler()
        .args(["top", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("No column found for the 'gender' role"));
}

#[test]
fn report_json_is_machine_readable() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    let output = profiler()
        .args(["report", "-i", &input, "--json"])
        .output()
        .expect("run report");
    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report is json");
    assert_eq!(report["rows"], 8);
    assert_eq!(report["roles"]["product"], "Product Category");
    assert_eq!(report["peak_period"]["data"]["month_name"], "February");
    assert_eq!(report["top_products_by_gender"][0]["group"], "Male");
}

#[test]
fn report_text_includes_every_section() {
    let workspace = TestWorkspace::new();
    let input = sales_file(&workspace);
    profiler()
        .args(["report", "-i", &input])
        .assert()
        .success()
        .stdout(contains("Avg_Basket_Value"))
        .stdout(contains("Peak month"))
        .stdout(contains("Highest sales recorded"))
        .stdout(contains("top_category"));
}

#[test]
fn missing_input_file_fails() {
    let workspace = TestWorkspace::new();
    let missing = workspace.path().join("absent.csv");
    profiler()
        .args(["metrics", "-i", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Opening input file"));
}

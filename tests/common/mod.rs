#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::UTF_8;
use sales_profiler::{data::Table, io_utils};
use tempfile::{TempDir, tempdir};

/// Small retail extract: two genders, three months in 2023 and one in 2024,
/// one row with an unparseable date and one with a blank quantity.
pub const SALES_CSV: &str = "\
Transaction ID,Date,Customer ID,Gender,Age,Product Category,Quantity,Price per Unit,Total Amount
1,2023-01-15,CUST001,Male,34,Beauty,3,50,150
2,2023-02-03,CUST002,Female,26,Clothing,2,500,1000
3,2023-01-20,CUST003,Male,50,Electronics,1,30,30
4,2023-02-27,CUST004,Male,37,Clothing,1,500,500
5,2023-03-05,CUST005,Male,30,Beauty,2,50,100
6,not a date,CUST006,Female,45,Beauty,1,30,30
7,2024-01-09,CUST007,Female,46,Clothing,,25,50
8,2023-02-14,CUST008,Female,30,Electronics,4,25,100
";

/// Parses CSV text the same way the binary does.
pub fn table_from_csv(contents: &str) -> Table {
    let mut reader = io_utils::open_csv_reader(contents.as_bytes(), b',');
    io_utils::read_table(&mut reader, UTF_8).expect("read table")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_explorer::data::{Cell, Dataset};
use tempfile::{TempDir, tempdir};

pub const PASSENGERS_CSV: &str = "\
name,sex,age,fare,embarked
Braund,male,22,7.25,S
Cumings,female,38,71.2833,C
Heikkinen,female,26,7.925,S
Futrelle,female,35,53.1,S
Allen,male,35,8.05,S
Moran,male,,8.4583,Q
McCarthy,male,54,51.8625,S
Palsson,male,2,21.075,S
";

pub const SALES_CSV: &str = "\
order_date,region,units,revenue
2024-03-01,north,10,100
2024-03-02,south,12,120
2024-03-03,north,14,140
2024-03-04,south,16,160
2024-03-05,north,18,180
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

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

/// Builds a dataset from string literals, mapping `None` to Null.
pub fn dataset(columns: &[&str], rows: &[&[Option<&str>]]) -> Dataset {
    Dataset::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(Cell::Null, Cell::from))
                    .collect()
            })
            .collect(),
    )
}

/// Builds a dataset where every cell is numeric.
pub fn numeric_dataset(columns: &[&str], rows: &[&[f64]]) -> Dataset {
    Dataset::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| Cell::Number(*v)).collect())
            .collect(),
    )
}

pub fn passengers() -> Dataset {
    let mut lines = PASSENGERS_CSV.lines();
    let headers = lines
        .next()
        .expect("header")
        .split(',')
        .map(String::from)
        .collect();
    let records = lines
        .map(|line| line.split(',').map(String::from).collect())
        .collect();
    Dataset::from_text(headers, records)
}

pub fn column_texts(dataset: &Dataset, column: &str) -> Vec<String> {
    dataset
        .column_cells(column)
        .map(|cell| cell.to_text().into_owned())
        .collect()
}

//! Dataset Module
//!
//! Reader for the delimited tabular dataset: a header row naming columns,
//! then data rows. The dataset is an opaque read-only source; it is loaded
//! fresh on every aggregation and never mutated.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::StringRecord;

use crate::error::Result;

// == Dataset ==
/// A fully loaded tabular dataset with named columns.
#[derive(Debug)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Dataset {
    // == Open ==
    /// Loads the dataset at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Loads a dataset from any reader producing delimited rows with a
    /// header line.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let rows = csv_reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    // == Schema ==
    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of a named column, if it exists.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    // == Rows ==
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

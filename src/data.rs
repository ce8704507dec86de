//! Holdout - Tabular dataset handling
//!
//! Loads tab-separated files with a header row into memory.
//! Also supports reading from stdin for pipeline workflows.

use anyhow::{Context, Result};
use csv::StringRecord;
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{SplitError, SplitResult};

/// Raw bytes of the source before parsing
enum DataStorage {
    /// Memory-mapped file
    Mmap(Mmap),
    /// In-memory buffer (for stdin or empty files)
    InMemory(Vec<u8>),
}

impl DataStorage {
    fn as_bytes(&self) -> &[u8] {
        match self {
            DataStorage::Mmap(m) => m.as_ref(),
            DataStorage::InMemory(v) => v.as_slice(),
        }
    }
}

/// An ordered table of rows sharing one column header.
///
/// A row's index is its position in the table; every dataset derived from
/// another one (`head`, `select`, a split) is indexed again from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<StringRecord>,
    /// Where the rows came from, for display
    pub source: String,
    /// Size of the loaded source in bytes; 0 for in-memory and derived datasets
    pub size: u64,
}

/// Borrowed view of a single row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    columns: &'a [String],
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Position of this row in its dataset
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value stored under `column`, if the column exists
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let pos = self.columns.iter().position(|c| c == column)?;
        self.record.get(pos)
    }

    /// Values in header order
    pub fn values(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.record.iter()
    }

    /// `(column, value)` pairs in header order
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.record.iter())
    }
}

impl Dataset {
    /// Build a dataset from in-memory values.
    ///
    /// Every row must hold exactly one value per column.
    pub fn new<S: Into<String>>(columns: Vec<S>, rows: Vec<Vec<String>>) -> SplitResult<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut records = Vec::with_capacity(rows.len());
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != columns.len() {
                return Err(SplitError::RaggedRow {
                    row,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            records.push(StringRecord::from(values));
        }

        Ok(Self {
            columns,
            rows: records,
            source: "<memory>".to_string(),
            size: 0,
        })
    }

    /// Open a tab-separated file and read every row into memory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)
            .with_context(|| format!("Failed to open file: {}", path_ref.display()))?;

        let size = file.metadata()?.len();

        let storage = if size == 0 {
            DataStorage::InMemory(Vec::new())
        } else {
            // SAFETY: the map is read-only and dropped once parsing completes.
            let mmap = unsafe { Mmap::map(&file) }
                .with_context(|| format!("Failed to map file: {}", path_ref.display()))?;
            DataStorage::Mmap(mmap)
        };

        let source = path_ref.display().to_string();
        let mut dataset = Self::from_reader(storage.as_bytes(), &source)?;
        dataset.size = size;
        Ok(dataset)
    }

    /// Read dataset from stdin
    ///
    /// Supports pipeline workflows: `cat data.tsv | holdout -`
    pub fn from_stdin() -> Result<Self> {
        let mut buffer = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .with_context(|| "Failed to read from stdin")?;

        let storage = DataStorage::InMemory(buffer);
        let mut dataset = Self::from_reader(storage.as_bytes(), "<stdin>")?;
        dataset.size = storage.as_bytes().len() as u64;
        Ok(dataset)
    }

    /// Parse tab-separated text with a header row
    ///
    /// Rows shorter than the header are padded with empty values; rows
    /// longer than the header are an error.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", source))?
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let mut record =
                result.with_context(|| format!("Failed to read row {} of {}", i, source))?;
            if record.len() > columns.len() {
                return Err(SplitError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    found: record.len(),
                })
                .with_context(|| format!("Failed to read row {} of {}", i, source));
            }
            while record.len() < columns.len() {
                record.push_field("");
            }
            rows.push(record);
        }

        tracing::debug!(
            "Parsed {} rows x {} columns from {}",
            rows.len(),
            columns.len(),
            source
        );

        Ok(Self {
            columns,
            rows,
            source: source.to_string(),
            size: 0,
        })
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows (the header is not counted)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index (0-indexed)
    ///
    /// Returns None if index is out of bounds.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|record| Row {
            index,
            columns: &self.columns,
            record,
        })
    }

    /// Iterate over all rows in order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().enumerate().map(|(index, record)| Row {
            index,
            columns: &self.columns,
            record,
        })
    }

    /// Copy the rows at `positions`, in that order, into a new dataset.
    ///
    /// Positions past the end are skipped. `self` is left untouched and the
    /// result carries no source size.
    pub fn select<I: IntoIterator<Item = usize>>(&self, positions: I) -> Self {
        let rows = positions
            .into_iter()
            .filter_map(|i| self.rows.get(i).cloned())
            .collect();

        Self {
            columns: self.columns.clone(),
            rows,
            source: self.source.clone(),
            size: 0,
        }
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Self {
        self.select(0..n.min(self.rows.len()))
    }

    /// Get formatted source size string
    pub fn size_human(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if self.size >= GB {
            format!("{:.2} GB", self.size as f64 / GB as f64)
        } else if self.size >= MB {
            format!("{:.2} MB", self.size as f64 / MB as f64)
        } else if self.size >= KB {
            format!("{:.2} KB", self.size as f64 / KB as f64)
        } else {
            format!("{} B", self.size)
        }
    }
}

/// Renders an index column followed by every data column, right-aligned.
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "Empty dataset");
        }
        if self.rows.is_empty() {
            writeln!(f, "Empty dataset")?;
            return writeln!(f, "Columns: [{}]", self.columns.join(", "));
        }

        let index_width = (self.rows.len() - 1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(col))
                    .map(|v| v.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:>width$}", "", width = index_width)?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = *width)?;
        }
        writeln!(f)?;

        for (i, record) in self.rows.iter().enumerate() {
            write!(f, "{:>width$}", i, width = index_width)?;
            for (value, width) in record.iter().zip(&widths) {
                write!(f, "  {:>width$}", value, width = *width)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

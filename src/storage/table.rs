//! Schema-less CSV tables.
//!
//! Offline analysis works on whatever columns the saved files carry, so
//! these helpers keep every column as text and only look up the ones they
//! need by name.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// A CSV table held in memory: one header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read a CSV file with a header row.
    ///
    /// Short rows are padded with empty cells, long rows truncated.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path.as_ref())?;
        Self::from_csv(reader)
    }

    /// Parse CSV text with a header row.
    pub fn parse(text: &str) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        Self::from_csv(reader)
    }

    fn from_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let mut row: Vec<String> = record?.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    /// Write the table as CSV, creating parent directories.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All cells of a named column, or a validation error if it is absent.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| AppError::validation(format!("expected column '{name}' not found")))?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Add a column, or overwrite it if one with the same name exists.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(AppError::validation(format!(
                "column '{name}' has {} values, table has {} rows",
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Stack tables vertically. The header is the union of all headers in
    /// first-seen order; cells a table lacks are left empty.
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Table {
        let tables: Vec<Table> = tables.into_iter().collect();

        let mut headers: Vec<String> = Vec::new();
        for table in &tables {
            for header in &table.headers {
                if !headers.contains(header) {
                    headers.push(header.clone());
                }
            }
        }

        let mut merged = Table::new(headers);
        for table in tables {
            let mapping: Vec<Option<usize>> = merged
                .headers
                .iter()
                .map(|h| table.column_index(h))
                .collect();
            for row in table.rows {
                let cells = mapping
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
                    .collect();
                merged.rows.push(cells);
            }
        }
        merged
    }
}

/// Merge several CSV files into one output file.
///
/// Missing files are skipped with a warning; it is an error if none exist.
pub fn merge_files(files: &[PathBuf], output: &Path) -> Result<Table> {
    let mut tables = Vec::new();
    for file in files {
        if file.exists() {
            let table = Table::read(file)?;
            log::info!("Loaded {} rows from {}", table.len(), file.display());
            tables.push(table);
        } else {
            log::warn!("File not found: {}", file.display());
        }
    }

    if tables.is_empty() {
        return Err(AppError::validation("no data to merge"));
    }

    let count = tables.len();
    let merged = Table::concat(tables);
    merged.write(output)?;
    log::info!("Merged {} files into {}", count, output.display());
    log::info!("Total rows: {}", merged.len());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn parse_pads_short_rows() {
        let table = Table::parse("a,b,c\n1,2\n3,4,5\n").unwrap();
        assert_eq!(table.rows()[0], ["1", "2", ""]);
        assert_eq!(table.column("c").unwrap(), ["", "5"]);
        assert!(table.column("missing").is_err());
    }

    #[test]
    fn set_column_appends_and_overwrites() {
        let mut table = Table::parse("text\nhi\nbye\n").unwrap();
        table
            .set_column("score", vec!["1".into(), "2".into()])
            .unwrap();
        table
            .set_column("text", vec!["x".into(), "y".into()])
            .unwrap();
        assert_eq!(table.headers(), ["text", "score"]);
        assert_eq!(table.rows()[1], ["y", "2"]);
        assert!(table.set_column("bad", vec!["1".into()]).is_err());
    }

    #[test]
    fn concat_unions_headers() {
        let a = Table::parse("author,text\nann,hello\n").unwrap();
        let b = Table::parse("text,likes\nyo,3\n").unwrap();
        let merged = Table::concat([a, b]);
        assert_eq!(merged.headers(), ["author", "text", "likes"]);
        assert_eq!(merged.rows()[0], ["ann", "hello", ""]);
        assert_eq!(merged.rows()[1], ["", "yo", "3"]);
    }

    #[test]
    fn merge_files_skips_missing_and_writes_output() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("one.csv");
        std::fs::write(&first, "author,text\nann,\"multi\nline\"\n").unwrap();
        let missing = tmp.path().join("missing.csv");
        let output = tmp.path().join("out/merged.csv");

        let merged = merge_files(&[first, missing.clone()], &output).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(Table::read(&output).unwrap(), merged);

        assert!(merge_files(&[missing], &output).is_err());
    }
}

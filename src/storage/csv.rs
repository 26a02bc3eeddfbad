use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::error::Result;
use super::table::{Row, Table};

/// How `CsvReader::read_text` interprets its string argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The text names a CSV file on disk.
    Path,
    /// The text is the CSV document itself.
    Content,
}

/// Feeds a CSV source through the `csv` tokenizer and into a [`Table`].
#[derive(Debug, Clone)]
pub struct CsvReader {
    delimiter: u8,
    quote: u8,
    trim: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn read_file(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)?;
        debug!(path = %path.display(), "reading CSV file");
        self.read_from_reader(BufReader::new(file))
    }

    pub fn read_text(&self, text: &str, source: TextSource) -> Result<Table> {
        match source {
            TextSource::Path => self.read_file(Path::new(text)),
            TextSource::Content => self.read_from_reader(text.as_bytes()),
        }
    }

    pub fn read_from_reader<R: Read>(&self, reader: R) -> Result<Table> {
        let mut reader = self.builder().from_reader(reader);
        self.read_from_csv(&mut reader)
    }

    /// Drains an already-open tokenizer. The first record becomes the key-set,
    /// so `reader` should have been built with `has_headers(false)`; a reader
    /// that consumed its own header row yields a table keyed on the first
    /// data row instead.
    pub fn read_from_csv<R: Read>(&self, reader: &mut csv::Reader<R>) -> Result<Table> {
        let mut table = Table::new();
        let mut position = 0;

        for record in reader.records() {
            let record = record?;
            position += 1;
            let values = record.iter().map(str::to_string).collect();
            table.put_row(position, Row::new(values))?;
        }

        debug!(
            columns = table.column_count().unwrap_or(0),
            rows = table.row_count().unwrap_or(0),
            "loaded CSV table"
        );
        Ok(table)
    }

    fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .trim(if self.trim { Trim::All } else { Trim::None });
        builder
    }
}

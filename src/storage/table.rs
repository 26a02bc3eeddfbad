use std::fmt;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::csv::{CsvReader, TextSource};
use super::error::{Result, TableError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }
}

impl From<Vec<String>> for Row {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

impl From<Vec<&str>> for Row {
    fn from(values: Vec<&str>) -> Self {
        Self::new(values.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.values.join(", "))
    }
}

/// Outcome of probing the key-set for a name, without failing on a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLookup {
    pub key: String,
    pub index: Option<usize>,
}

impl KeyLookup {
    pub fn exists(&self) -> bool {
        self.index.is_some()
    }
}

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Uninitialized,
    Ready {
        header: Row,
        rows: Vec<Row>,
    },
}

/// A CSV document held in memory: the first row is the key-set (header),
/// every following row is a value row of the same width.
///
/// A table is immutable once built. Queries against a table that never
/// received a header row fail with [`TableError::EmptyTable`].
#[derive(Debug, Clone, Default)]
pub struct Table {
    state: State,
}

impl Table {
    /// An uninitialized table with no key-set and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from already-tokenized rows. Row 0 becomes the key-set;
    /// the first value row whose width differs aborts the build.
    pub fn from_rows<I, R>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Row>,
    {
        let mut table = Self::new();
        for (position, row) in rows.into_iter().enumerate() {
            table.put_row(position + 1, row.into())?;
        }
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        CsvReader::new().read_file(path.as_ref())
    }

    pub fn from_text(text: &str, source: TextSource) -> Result<Self> {
        CsvReader::new().read_text(text, source)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        CsvReader::new().read_from_reader(reader)
    }

    pub fn from_csv_reader<R: Read>(reader: &mut csv::Reader<R>) -> Result<Self> {
        CsvReader::new().read_from_csv(reader)
    }

    // `position` is 1-based; the key-set is position 1.
    pub(crate) fn put_row(&mut self, position: usize, row: Row) -> Result<()> {
        if let State::Ready { header, rows } = &mut self.state {
            if row.len() != header.len() {
                debug!(position, expected = header.len(), found = row.len(), "row width mismatch");
                return Err(TableError::SchemaMismatch {
                    row: position,
                    expected: header.len(),
                    found: row.len(),
                });
            }
            rows.push(row);
            return Ok(());
        }

        self.state = State::Ready {
            header: row,
            rows: Vec::new(),
        };
        Ok(())
    }

    fn parts(&self) -> Result<(&Row, &[Row])> {
        match &self.state {
            State::Ready { header, rows } => Ok((header, rows)),
            State::Uninitialized => Err(TableError::EmptyTable),
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    pub fn header(&self) -> Result<&Row> {
        self.parts().map(|(header, _)| header)
    }

    /// Value rows, excluding the key-set, in input order.
    pub fn rows(&self) -> Result<&[Row]> {
        self.parts().map(|(_, rows)| rows)
    }

    /// The key-set followed by every value row.
    pub fn all_rows(&self) -> Result<Vec<&Row>> {
        let (header, rows) = self.parts()?;
        Ok(std::iter::once(header).chain(rows.iter()).collect())
    }

    pub fn header_at(&self, index: usize) -> Result<&str> {
        let header = self.header()?;
        header.get(index).ok_or(TableError::IndexOutOfRange {
            what: "header",
            index,
            len: header.len(),
        })
    }

    /// Position of the first header equal to `name`.
    pub fn column_index_of(&self, name: &str) -> Result<usize> {
        self.header()?
            .iter()
            .position(|key| key == name)
            .ok_or_else(|| TableError::KeyNotFound(name.to_string()))
    }

    pub fn value_by_index(&self, row: usize, column: usize) -> Result<&str> {
        let (header, rows) = self.parts()?;
        if row >= rows.len() {
            return Err(TableError::IndexOutOfRange {
                what: "row",
                index: row,
                len: rows.len(),
            });
        }
        if column >= header.len() {
            return Err(TableError::IndexOutOfRange {
                what: "column",
                index: column,
                len: header.len(),
            });
        }
        Ok(&rows[row].values[column])
    }

    pub fn value_by_name(&self, name: &str, row: usize) -> Result<&str> {
        let column = self.column_index_of(name)?;
        self.value_by_index(row, column)
    }

    pub fn column_by_index(&self, column: usize) -> Result<Vec<&str>> {
        let (header, rows) = self.parts()?;
        if column >= header.len() {
            return Err(TableError::IndexOutOfRange {
                what: "column",
                index: column,
                len: header.len(),
            });
        }
        Ok(rows.iter().map(|row| row.values[column].as_str()).collect())
    }

    pub fn column_by_name(&self, name: &str) -> Result<Vec<&str>> {
        let column = self.column_index_of(name)?;
        self.column_by_index(column)
    }

    pub fn header_len(&self) -> Result<usize> {
        self.header().map(Row::len)
    }

    /// Same as [`Table::header_len`]; every row has the header's width.
    pub fn column_count(&self) -> Result<usize> {
        self.header_len()
    }

    pub fn row_count(&self) -> Result<usize> {
        self.rows().map(<[Row]>::len)
    }

    /// Value rows plus the key-set row.
    pub fn total_row_count(&self) -> Result<usize> {
        self.row_count().map(|count| count + 1)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index_of(name).is_ok()
    }

    pub fn has_columns<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().all(|name| self.has_column(name.as_ref()))
    }

    pub fn lookup_key(&self, name: &str) -> KeyLookup {
        KeyLookup {
            key: name.to_string(),
            index: self.column_index_of(name).ok(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Uninitialized => write!(f, "Table{{header=null, rows=[]}}"),
            State::Ready { header, rows } => {
                let rows: Vec<String> = rows.iter().map(Row::to_string).collect();
                write!(f, "Table{{header={}, rows=[{}]}}", header, rows.join(", "))
            }
        }
    }
}

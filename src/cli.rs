use clap::Parser;
use std::path::PathBuf;

use crate::storage::csv::CsvReader;
use crate::storage::error::Result;
use crate::storage::table::Table;

#[derive(Parser, Debug)]
#[command(name = "csvtable")]
#[command(author, version, about = "Random access to the rows and columns of a CSV file")]
pub struct Cli {
    /// Path to a CSV file; its first row is the header
    #[arg(required = true)]
    pub path: PathBuf,

    /// Print every value of the named column
    #[arg(short, long, conflicts_with = "cell")]
    pub column: Option<String>,

    /// Print one value as ROW,COLUMN (COLUMN is a zero-based index or a header name;
    /// whitespace around either part is ignored)
    #[arg(long, value_parser = parse_cell)]
    pub cell: Option<CellRef>,

    /// Print header, column and row counts
    #[arg(long, conflicts_with_all = ["column", "cell"])]
    pub info: bool,

    /// Output format when printing the whole table
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// CSV delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,

    /// Trim whitespace around every field
    #[arg(long)]
    pub trim: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub column: ColumnRef,
}

impl CellRef {
    pub fn resolve<'a>(&self, table: &'a Table) -> Result<&'a str> {
        match &self.column {
            ColumnRef::Index(column) => table.value_by_index(self.row, *column),
            ColumnRef::Name(name) => table.value_by_name(name, self.row),
        }
    }
}

// Both parts are trimmed; a purely numeric column is taken as an index.
fn parse_cell(s: &str) -> std::result::Result<CellRef, String> {
    let (row, column) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COLUMN, got '{}'", s))?;
    let (row, column) = (row.trim(), column.trim());
    let row = row
        .parse::<usize>()
        .map_err(|e| format!("invalid row index '{}': {}", row, e))?;
    let column = match column.parse::<usize>() {
        Ok(index) => ColumnRef::Index(index),
        Err(_) if column.is_empty() => return Err("missing column".to_string()),
        Err(_) => ColumnRef::Name(column.to_string()),
    };
    Ok(CellRef { row, column })
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn csv_reader(&self) -> std::result::Result<CsvReader, String> {
        if !self.delimiter.is_ascii() {
            return Err(format!("delimiter must be a single ASCII character, got '{}'", self.delimiter));
        }
        Ok(CsvReader::new()
            .with_delimiter(self.delimiter as u8)
            .with_trim(self.trim))
    }
}

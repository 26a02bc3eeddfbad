pub mod cli;
pub mod storage;

pub use storage::{CsvReader, KeyLookup, Result, Row, Table, TableError, TextSource};

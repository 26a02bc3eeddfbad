use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row length does not match key-set length at row {row}: expected {expected} fields, found {found}")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("The index is out of bound, the {what} index is {index} and the {what} length is {len}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("The key {0} is not found in the key-set")]
    KeyNotFound(String),

    #[error("Table has no key-set")]
    EmptyTable,
}

impl TableError {
    /// True when the underlying source could not be opened or read.
    pub fn is_io_failure(&self) -> bool {
        matches!(self, TableError::Io(_) | TableError::Csv(_))
    }
}

pub type Result<T> = std::result::Result<T, TableError>;

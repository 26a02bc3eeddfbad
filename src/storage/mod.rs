pub mod csv;
pub mod error;
pub mod table;

pub use self::csv::{CsvReader, TextSource};
pub use error::{Result, TableError};
pub use table::{KeyLookup, Row, Table};

//! Exporting accumulated leads.

mod csv;

pub use self::csv::{csv_columns, export_csv, write_csv, CsvColumn, DEFAULT_FILENAME};

pub mod csv_export;

pub use csv_export::{expenses_filename, write_expenses_csv, write_summary_csv, ExportError};

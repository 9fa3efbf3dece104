//! ipo-io — file boundary for the offer-performance analyzer.
//!
//! Register files arrive from varied export tools: UTF-8 or Windows-1252,
//! comma, semicolon, tab or pipe delimited, with or without a BOM. This
//! crate decodes and sniffs them into a [`RawTable`](ipo_engine::RawTable),
//! writes scored results back out as CSV, and keeps a capped JSON log of
//! past run summaries.

pub mod csv;
pub mod export;
pub mod history;

pub use crate::csv::{import, read_file_as_utf8, sniff_delimiter};
pub use crate::export::{export_csv, export_csv_path};
pub use crate::history::{HistoryEntry, HistoryLog, HISTORY_CAP};

use std::fmt;

#[derive(Debug)]
pub enum AnalyzeError {
    /// Sales table has no data rows — the run cannot proceed.
    NoSalesRows,
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSalesRows => write!(f, "sales register has no data rows"),
        }
    }
}

impl std::error::Error for AnalyzeError {}

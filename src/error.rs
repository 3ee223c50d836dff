use thiserror::Error;

use crate::builder::ContextKind;
use crate::types::Pt;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid number of columns in configuration: {widths} widths, {aligns} aligns")]
    Configuration { widths: usize, aligns: usize },

    #[error("invalid number of columns in configuration: header has {header} cells, table has {columns} columns")]
    HeaderMismatch { header: usize, columns: usize },

    #[error("invalid context for {operation}: expected {expected}, found {}", display_context(.found))]
    ContextViolation {
        operation: &'static str,
        expected: &'static str,
        found: Option<ContextKind>,
    },

    #[error("invalid size of row {row}: expected {expected} cells, found {found}")]
    RowSize {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("fill height cannot fit row {row}: {available} available, {natural} required")]
    FillHeight {
        row: usize,
        available: Pt,
        natural: Pt,
    },

    #[error("font error: {0}")]
    Font(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

fn display_context(found: &Option<ContextKind>) -> &'static str {
    match found {
        Some(kind) => kind.as_str(),
        None => "no open context",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_violation_names_both_sides() {
        let err = TableError::ContextViolation {
            operation: "close_row",
            expected: "row",
            found: Some(ContextKind::Cell),
        };
        assert_eq!(
            err.to_string(),
            "invalid context for close_row: expected row, found cell"
        );

        let err = TableError::ContextViolation {
            operation: "open_row",
            expected: "table",
            found: None,
        };
        assert!(err.to_string().ends_with("found no open context"));
    }

    #[test]
    fn fill_height_reports_row_and_sizes() {
        let err = TableError::FillHeight {
            row: 2,
            available: Pt::from_i32(9),
            natural: Pt::from_i32(10),
        };
        assert_eq!(
            err.to_string(),
            "fill height cannot fit row 2: 9.000pt available, 10.000pt required"
        );
    }
}

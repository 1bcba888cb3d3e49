use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Productivity must be greater than zero (rows: {})", join_rows(.rows))]
    InvalidProductivity { rows: Vec<usize> },

    #[error("Duration must be greater than zero (rows: {})", join_rows(.rows))]
    InvalidDuration { rows: Vec<usize> },

    #[error("Derivation failed: {0}")]
    Derivation(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook read error: {0}")]
    WorkbookRead(#[from] calamine::Error),

    #[error("Workbook write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),
}

impl PlanError {
    /// True for failures the user fixes by correcting the input file.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingColumns(_) | Self::InvalidProductivity { .. } | Self::InvalidDuration { .. }
        )
    }
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(feature = "python")]
impl From<PlanError> for pyo3::PyErr {
    fn from(err: PlanError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};

        if err.is_validation() {
            PyValueError::new_err(err.to_string())
        } else {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_every_column() {
        let err = PlanError::MissingColumns(vec!["Unit".into(), "Material".into()]);
        assert_eq!(err.to_string(), "Missing columns: Unit, Material");
        assert!(err.is_validation());
    }

    #[test]
    fn positivity_messages_name_rows() {
        let err = PlanError::InvalidDuration { rows: vec![2, 5] };
        assert_eq!(
            err.to_string(),
            "Duration must be greater than zero (rows: 2, 5)"
        );
        assert!(!PlanError::Derivation("x".into()).is_validation());
    }
}

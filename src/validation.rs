use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::PlanError;
use crate::schema::boq;

/// A table that passed the schema gate.
///
/// Only [`validate`] constructs one, so the derivation engine never sees a
/// table with missing columns or non-positive divisors.
#[derive(Debug, Clone)]
pub struct ValidatedTable(DataFrame);

impl ValidatedTable {
    pub fn frame(&self) -> &DataFrame {
        &self.0
    }

    pub fn height(&self) -> usize {
        self.0.height()
    }

    pub fn into_inner(self) -> DataFrame {
        self.0
    }
}

/// Validate a raw BOQ table.
///
/// Checks run in a fixed order and stop at the first failed category:
/// column presence, then productivity, then duration.
pub fn validate(df: DataFrame) -> Result<ValidatedTable, PlanError> {
    require_columns(&df, &boq::REQUIRED)?;

    let rows = non_positive_rows(&df, boq::PRODUCTIVITY)?;
    if !rows.is_empty() {
        warn!(count = rows.len(), "non-positive productivity");
        return Err(PlanError::InvalidProductivity { rows });
    }

    let rows = non_positive_rows(&df, boq::DURATION)?;
    if !rows.is_empty() {
        warn!(count = rows.len(), "non-positive duration");
        return Err(PlanError::InvalidDuration { rows });
    }

    debug!(rows = df.height(), "table validated");
    Ok(ValidatedTable(df))
}

/// Report every absent column, in the order of `required`.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), PlanError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        warn!(missing = ?missing, "required columns absent");
        Err(PlanError::MissingColumns(missing))
    }
}

/// 1-based row numbers whose value in `column` is `<= 0`.
///
/// Cells that do not read as numbers are skipped here; the derivation
/// engine rejects them when it coerces the column.
fn non_positive_rows(df: &DataFrame, column: &str) -> Result<Vec<usize>, PlanError> {
    let values = df.column(column)?.cast(&DataType::Float64)?;
    let rows = values
        .f64()?
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match v {
            Some(x) if x <= 0.0 => Some(i + 1),
            _ => None,
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(productivity: Vec<f64>, duration: Vec<f64>) -> DataFrame {
        let n = productivity.len();
        let text = |v: &str| vec![v.to_string(); n];
        DataFrame::new(vec![
            Column::new(boq::WORK_ITEM.into(), text("item")),
            Column::new(boq::UNIT.into(), text("m3")),
            Column::new(boq::QUANTITY.into(), vec![10.0; n]),
            Column::new(boq::DURATION.into(), duration),
            Column::new(boq::LABOR_TYPE.into(), text("mason")),
            Column::new(boq::PRODUCTIVITY.into(), productivity),
            Column::new(boq::MATERIAL.into(), text("cement")),
            Column::new(boq::MATERIAL_RATE.into(), vec![1.0; n]),
            Column::new(boq::MATERIAL_COST_PER_UNIT.into(), vec![1.0; n]),
            Column::new(boq::LABOR_COST_PER_DAY.into(), vec![1.0; n]),
        ])
        .unwrap()
    }

    #[test]
    fn accepts_positive_values() {
        let table = validate(frame(vec![1.0, 2.5], vec![3.0, 1.0])).unwrap();
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn missing_columns_reported_in_canonical_order() {
        let df = frame(vec![1.0], vec![1.0])
            .drop_many([boq::MATERIAL_RATE, boq::UNIT, boq::LABOR_COST_PER_DAY]);
        match validate(df) {
            Err(PlanError::MissingColumns(cols)) => assert_eq!(
                cols,
                vec![boq::UNIT, boq::MATERIAL_RATE, boq::LABOR_COST_PER_DAY]
            ),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn zero_productivity_rejected_with_row_numbers() {
        match validate(frame(vec![1.0, 0.0, -2.0], vec![1.0, 1.0, 1.0])) {
            Err(PlanError::InvalidProductivity { rows }) => assert_eq!(rows, vec![2, 3]),
            other => panic!("expected InvalidProductivity, got {other:?}"),
        }
    }

    #[test]
    fn productivity_checked_before_duration() {
        let result = validate(frame(vec![0.0], vec![0.0]));
        assert!(matches!(result, Err(PlanError::InvalidProductivity { .. })));

        let result = validate(frame(vec![1.0], vec![-1.0]));
        assert!(matches!(result, Err(PlanError::InvalidDuration { rows }) if rows == vec![1]));
    }

    #[test]
    fn empty_table_with_schema_is_valid() {
        let table = validate(frame(vec![], vec![])).unwrap();
        assert_eq!(table.height(), 0);
    }
}

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

use crate::error::PlanError;
use crate::schema::{boq, derived, overlay};
use crate::validation::ValidatedTable;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
pub(crate) const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// Pricing and calendar overlay applied after scheduling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    /// Profit margin in percent. Zero and negative values are accepted.
    pub margin_percent: f64,
    /// Calendar date of schedule day 1.
    pub start_date: NaiveDate,
}

/// Run-time options for one planning invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanOptions {
    pub overlay: Option<Overlay>,
}

/// Derive the augmented table from a validated BOQ.
///
/// Each stage is collected before the next one starts because later formulas
/// read columns produced by earlier ones:
///
/// 1. coerce numeric and identifier columns
/// 2. labor days needed
/// 3. workers needed (ceiling)
/// 4. cost and material totals
/// 5. sequential schedule in row order
/// 6. optional pricing/calendar overlay
///
/// Row order is preserved.
pub fn derive(table: &ValidatedTable, options: &PlanOptions) -> Result<DataFrame, PlanError> {
    let df = coerce(table.frame())?;
    debug!(rows = df.height(), "inputs coerced");

    let mut lazy = df.lazy();

    lazy = lazy.with_columns([
        (col(boq::QUANTITY) / col(boq::PRODUCTIVITY)).alias(derived::LABOR_DAYS_NEEDED)
    ]);

    lazy = lazy.with_columns([(col(derived::LABOR_DAYS_NEEDED) / col(boq::DURATION))
        .ceil()
        .cast(DataType::Int64)
        .alias(derived::WORKERS_NEEDED)]);

    lazy = lazy.with_columns([
        (col(derived::LABOR_DAYS_NEEDED) * col(boq::LABOR_COST_PER_DAY))
            .alias(derived::TOTAL_LABOR_COST),
        (col(boq::QUANTITY) * col(boq::MATERIAL_RATE)).alias(derived::TOTAL_MATERIAL_NEEDED),
    ]);

    lazy = lazy.with_columns([(col(derived::TOTAL_MATERIAL_NEEDED)
        * col(boq::MATERIAL_COST_PER_UNIT))
    .alias(derived::TOTAL_MATERIAL_COST)]);

    lazy = lazy.with_columns([(col(derived::TOTAL_LABOR_COST)
        + col(derived::TOTAL_MATERIAL_COST))
    .alias(derived::TOTAL_COST)]);

    // Back-to-back slots: each item ends after the running total of whole days.
    let slot = col(boq::DURATION).ceil().cast(DataType::Int64);
    lazy = lazy.with_columns([slot.clone().cum_sum(false).alias(derived::END_DAY)]);
    lazy = lazy.with_columns([
        (col(derived::END_DAY) - slot + lit(1i64)).alias(derived::START_DAY)
    ]);

    if let Some(ov) = options.overlay {
        lazy = apply_overlay(lazy, &ov);
    }

    let df = lazy.collect()?;
    ensure_complete(&df, &derived::ALL)?;
    if options.overlay.is_some() {
        ensure_complete(&df, &overlay::ALL)?;
    }

    debug!(rows = df.height(), overlay = options.overlay.is_some(), "derivation complete");
    Ok(df)
}

/// Strictly cast numeric inputs to Float64 and identifiers to String.
///
/// A cell that cannot be read as a number fails the whole batch.
fn coerce(frame: &DataFrame) -> Result<DataFrame, PlanError> {
    let mut df = frame.clone();
    for name in boq::NUMERIC {
        let column = df.column(name)?.strict_cast(&DataType::Float64).map_err(|e| {
            PlanError::Derivation(format!("Column '{}' is not numeric: {}", name, e))
        })?;
        df.with_column(column)?;
    }
    for name in boq::IDENTIFIERS {
        let column = df.column(name)?.cast(&DataType::String)?;
        df.with_column(column)?;
    }
    Ok(df)
}

fn apply_overlay(lazy: LazyFrame, ov: &Overlay) -> LazyFrame {
    let origin = ov.start_date.num_days_from_ce() - UNIX_EPOCH_CE_DAYS;
    let to_date = |day: &str| {
        (lit(origin as i64) + col(day) - lit(1i64))
            .cast(DataType::Int32)
            .cast(DataType::Date)
    };

    lazy.with_columns([
        (col(derived::TOTAL_COST) * lit(1.0 + ov.margin_percent / 100.0))
            .alias(overlay::SALE_PRICE),
        to_date(derived::START_DAY).alias(overlay::ACTUAL_START_DATE),
        to_date(derived::END_DAY).alias(overlay::ACTUAL_END_DATE),
    ])
}

/// Every derived value must be present. A null means a missing input cell or,
/// for the overlay dates, a schedule day outside the calendar range.
fn ensure_complete(df: &DataFrame, columns: &[&str]) -> Result<(), PlanError> {
    for &name in columns {
        let nulls = df.column(name)?.null_count();
        if nulls > 0 {
            return Err(PlanError::Derivation(format!(
                "Column '{}' has {} null values. Check the input cells it is computed from.",
                name, nulls
            )));
        }
    }
    Ok(())
}

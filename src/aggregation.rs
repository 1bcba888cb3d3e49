use polars::prelude::*;
use tracing::debug;

use crate::error::PlanError;
use crate::schema::{boq, derived};

/// Grouping dimension for the summary views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    LaborType,
    Material,
}

impl GroupBy {
    pub fn key(self) -> &'static str {
        match self {
            Self::LaborType => boq::LABOR_TYPE,
            Self::Material => boq::MATERIAL,
        }
    }

    /// Columns summed within each group.
    pub fn summed(self) -> &'static [&'static str] {
        match self {
            Self::LaborType => &[
                derived::WORKERS_NEEDED,
                derived::LABOR_DAYS_NEEDED,
                derived::TOTAL_LABOR_COST,
            ],
            Self::Material => &[
                derived::TOTAL_MATERIAL_NEEDED,
                derived::TOTAL_MATERIAL_COST,
            ],
        }
    }
}

/// Group the derived table and sum the dimension's columns.
///
/// Keys match exactly (case-sensitive) and groups appear in the order their
/// key is first seen. An empty table yields an empty view.
pub fn grouped_sum(derived_df: &DataFrame, by: GroupBy) -> Result<DataFrame, PlanError> {
    let sums: Vec<Expr> = by.summed().iter().map(|c| col(*c).sum()).collect();

    let df = derived_df
        .clone()
        .lazy()
        .group_by_stable([col(by.key())])
        .agg(sums)
        .collect()?;

    debug!(by = by.key(), groups = df.height(), "grouped view built");
    Ok(df)
}

/// Labor headcount, labor days and labor cost per labor type.
pub fn resource_view(derived_df: &DataFrame) -> Result<DataFrame, PlanError> {
    grouped_sum(derived_df, GroupBy::LaborType)
}

/// Material quantity and material cost per material.
pub fn procurement_view(derived_df: &DataFrame) -> Result<DataFrame, PlanError> {
    grouped_sum(derived_df, GroupBy::Material)
}

pub fn budget_view(derived_df: &DataFrame) -> Result<DataFrame, PlanError> {
    project(
        derived_df,
        &[
            boq::WORK_ITEM,
            derived::TOTAL_LABOR_COST,
            derived::TOTAL_MATERIAL_COST,
            derived::TOTAL_COST,
        ],
    )
}

pub fn schedule_view(derived_df: &DataFrame) -> Result<DataFrame, PlanError> {
    project(
        derived_df,
        &[
            boq::WORK_ITEM,
            derived::START_DAY,
            derived::END_DAY,
            boq::DURATION,
        ],
    )
}

/// Column projection in original row order.
fn project(df: &DataFrame, columns: &[&str]) -> Result<DataFrame, PlanError> {
    Ok(df.select(columns.iter().copied())?)
}

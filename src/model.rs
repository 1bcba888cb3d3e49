use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::derivation::UNIX_EPOCH_CE_DAYS;
use crate::error::PlanError;
use crate::schema::*;

/// One bill-of-quantities line as supplied by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemRow {
    pub work_item: String,
    pub unit: String,
    pub quantity: f64,
    pub duration_days: f64,
    pub labor_type: String,
    pub productivity: f64,
    pub material: String,
    pub material_rate: f64,
    pub material_cost_per_unit: f64,
    pub labor_cost_per_day: f64,
}

/// A work item with every derived field filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedWorkItemRow {
    #[serde(flatten)]
    pub input: WorkItemRow,
    pub labor_days_needed: f64,
    pub workers_needed: i64,
    pub total_labor_cost: f64,
    pub total_material_needed: f64,
    pub total_material_cost: f64,
    pub total_cost: f64,
    pub start_day: i64,
    pub end_day: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
}

/// Build a BOQ DataFrame with canonical column names from typed rows.
pub fn work_items_frame(rows: &[WorkItemRow]) -> Result<DataFrame, PlanError> {
    let text = |f: fn(&WorkItemRow) -> &str| -> Vec<String> {
        rows.iter().map(|r| f(r).to_string()).collect()
    };
    let num = |f: fn(&WorkItemRow) -> f64| -> Vec<f64> { rows.iter().map(f).collect() };

    let df = DataFrame::new(vec![
        Column::new(boq::WORK_ITEM.into(), text(|r| r.work_item.as_str())),
        Column::new(boq::UNIT.into(), text(|r| r.unit.as_str())),
        Column::new(boq::QUANTITY.into(), num(|r| r.quantity)),
        Column::new(boq::DURATION.into(), num(|r| r.duration_days)),
        Column::new(boq::LABOR_TYPE.into(), text(|r| r.labor_type.as_str())),
        Column::new(boq::PRODUCTIVITY.into(), num(|r| r.productivity)),
        Column::new(boq::MATERIAL.into(), text(|r| r.material.as_str())),
        Column::new(boq::MATERIAL_RATE.into(), num(|r| r.material_rate)),
        Column::new(
            boq::MATERIAL_COST_PER_UNIT.into(),
            num(|r| r.material_cost_per_unit),
        ),
        Column::new(boq::LABOR_COST_PER_DAY.into(), num(|r| r.labor_cost_per_day)),
    ])?;
    Ok(df)
}

/// The finished plan: derived table plus its aggregate views.
///
/// Every frame is owned by the plan; none alias the caller's input.
#[derive(Debug, Clone)]
pub struct ProjectPlan {
    pub derived: DataFrame,
    pub resources: DataFrame,
    pub procurement: DataFrame,
    pub budget: DataFrame,
    pub schedule: DataFrame,
    pub start_date: Option<NaiveDate>,
}

impl ProjectPlan {
    /// Sum of `Total Cost` over all work items; zero for an empty plan.
    pub fn total_cost(&self) -> Result<f64, PlanError> {
        let total = self
            .derived
            .column(derived::TOTAL_COST)?
            .f64()?
            .sum()
            .unwrap_or(0.0);
        Ok(total)
    }

    /// `(work item, total cost)` per row, in schedule order.
    pub fn cost_lines(&self) -> Result<Vec<(String, f64)>, PlanError> {
        let items = string_values(&self.derived, boq::WORK_ITEM)?;
        let costs = f64_values(&self.derived, derived::TOTAL_COST)?;
        Ok(items.into_iter().zip(costs).collect())
    }

    /// Typed view of the derived table.
    pub fn rows(&self) -> Result<Vec<DerivedWorkItemRow>, PlanError> {
        let df = &self.derived;

        let work_item = string_values(df, boq::WORK_ITEM)?;
        let unit = string_values(df, boq::UNIT)?;
        let labor_type = string_values(df, boq::LABOR_TYPE)?;
        let material = string_values(df, boq::MATERIAL)?;
        let quantity = f64_values(df, boq::QUANTITY)?;
        let duration = f64_values(df, boq::DURATION)?;
        let productivity = f64_values(df, boq::PRODUCTIVITY)?;
        let material_rate = f64_values(df, boq::MATERIAL_RATE)?;
        let material_cost = f64_values(df, boq::MATERIAL_COST_PER_UNIT)?;
        let labor_cost = f64_values(df, boq::LABOR_COST_PER_DAY)?;

        let labor_days = f64_values(df, derived::LABOR_DAYS_NEEDED)?;
        let workers = i64_values(df, derived::WORKERS_NEEDED)?;
        let total_labor = f64_values(df, derived::TOTAL_LABOR_COST)?;
        let material_needed = f64_values(df, derived::TOTAL_MATERIAL_NEEDED)?;
        let total_material = f64_values(df, derived::TOTAL_MATERIAL_COST)?;
        let total_cost = f64_values(df, derived::TOTAL_COST)?;
        let start_day = i64_values(df, derived::START_DAY)?;
        let end_day = i64_values(df, derived::END_DAY)?;

        let sale_price = optional_f64_values(df, overlay::SALE_PRICE)?;
        let start_date = optional_date_values(df, overlay::ACTUAL_START_DATE)?;
        let end_date = optional_date_values(df, overlay::ACTUAL_END_DATE)?;

        let rows = (0..df.height())
            .map(|i| DerivedWorkItemRow {
                input: WorkItemRow {
                    work_item: work_item[i].clone(),
                    unit: unit[i].clone(),
                    quantity: quantity[i],
                    duration_days: duration[i],
                    labor_type: labor_type[i].clone(),
                    productivity: productivity[i],
                    material: material[i].clone(),
                    material_rate: material_rate[i],
                    material_cost_per_unit: material_cost[i],
                    labor_cost_per_day: labor_cost[i],
                },
                labor_days_needed: labor_days[i],
                workers_needed: workers[i],
                total_labor_cost: total_labor[i],
                total_material_needed: material_needed[i],
                total_material_cost: total_material[i],
                total_cost: total_cost[i],
                start_day: start_day[i],
                end_day: end_day[i],
                sale_price: sale_price.as_ref().and_then(|v| v[i]),
                actual_start_date: start_date.as_ref().and_then(|v| v[i]),
                actual_end_date: end_date.as_ref().and_then(|v| v[i]),
            })
            .collect();

        Ok(rows)
    }
}

// ── Column extraction helpers ───────────────────────────────────────────────

fn null_error(column: &str) -> PlanError {
    PlanError::Derivation(format!("Unexpected null in column '{}'", column))
}

fn string_values(df: &DataFrame, column: &str) -> Result<Vec<String>, PlanError> {
    df.column(column)?
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()).ok_or_else(|| null_error(column)))
        .collect()
}

fn f64_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, PlanError> {
    df.column(column)?
        .f64()?
        .into_iter()
        .map(|v| v.ok_or_else(|| null_error(column)))
        .collect()
}

fn i64_values(df: &DataFrame, column: &str) -> Result<Vec<i64>, PlanError> {
    df.column(column)?
        .i64()?
        .into_iter()
        .map(|v| v.ok_or_else(|| null_error(column)))
        .collect()
}

fn optional_f64_values(df: &DataFrame, column: &str) -> Result<Option<Vec<Option<f64>>>, PlanError> {
    match df.column(column) {
        Ok(c) => Ok(Some(c.f64()?.into_iter().collect())),
        Err(_) => Ok(None),
    }
}

fn optional_date_values(
    df: &DataFrame,
    column: &str,
) -> Result<Option<Vec<Option<NaiveDate>>>, PlanError> {
    let Ok(c) = df.column(column) else {
        return Ok(None);
    };
    let days = c.cast(&DataType::Int32)?;
    let dates = days
        .i32()?
        .into_iter()
        .map(|d| {
            d.and_then(|d| d.checked_add(UNIX_EPOCH_CE_DAYS))
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .map(Some)
                .ok_or_else(|| null_error(column))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(dates))
}

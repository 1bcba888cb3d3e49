//! Bill-of-quantities planning pipeline.
//!
//! A raw BOQ table goes through a validation gate, a fixed chain of
//! column-wise derivations (labor, material, cost, sequential schedule,
//! optional pricing/calendar overlay) and a set of summary views. The result
//! is a [`ProjectPlan`] that report writers consume.

pub mod aggregation;
pub mod derivation;
pub mod error;
pub mod model;
pub mod report;
pub mod schema;
pub mod validation;
pub mod workbook;

#[cfg(feature = "python")]
mod python;

use polars::prelude::DataFrame;
use tracing::info;

pub use derivation::{derive, Overlay, PlanOptions};
pub use error::PlanError;
pub use model::{work_items_frame, DerivedWorkItemRow, ProjectPlan, WorkItemRow};
pub use report::{CostLine, PlanSummary};
pub use validation::{validate, ValidatedTable};

/// Run the full pipeline on one raw table.
///
/// Headers are normalised, the table is validated, then derived and
/// aggregated. Any failure abandons the whole invocation; nothing partial is
/// returned.
pub fn plan(raw: DataFrame, options: &PlanOptions) -> Result<ProjectPlan, PlanError> {
    let raw = workbook::normalize_headers(raw)?;
    let table = validate(raw)?;
    let derived = derive(&table, options)?;

    let plan = ProjectPlan {
        resources: aggregation::resource_view(&derived)?,
        procurement: aggregation::procurement_view(&derived)?,
        budget: aggregation::budget_view(&derived)?,
        schedule: aggregation::schedule_view(&derived)?,
        start_date: options.overlay.map(|o| o.start_date),
        derived,
    };

    info!(
        items = plan.derived.height(),
        labor_types = plan.resources.height(),
        materials = plan.procurement.height(),
        "plan derived"
    );
    Ok(plan)
}

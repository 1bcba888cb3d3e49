use std::path::PathBuf;

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyModule};
use pyo3_polars::PyDataFrame;

use crate::derivation::{Overlay, PlanOptions};
use crate::model::ProjectPlan;
use crate::report::PlanSummary;
use crate::schema::{boq, derived, overlay, sheets};
use crate::workbook;

/// A derived project plan, exposed to Python.
#[pyclass(name = "ProjectPlan")]
pub struct PyProjectPlan {
    inner: ProjectPlan,
}

#[pymethods]
impl PyProjectPlan {
    // ── Frames ──────────────────────────────────────────────────────────────

    #[getter]
    fn derived(&self) -> PyDataFrame {
        PyDataFrame(self.inner.derived.clone())
    }

    #[getter]
    fn resources(&self) -> PyDataFrame {
        PyDataFrame(self.inner.resources.clone())
    }

    #[getter]
    fn procurement(&self) -> PyDataFrame {
        PyDataFrame(self.inner.procurement.clone())
    }

    #[getter]
    fn budget(&self) -> PyDataFrame {
        PyDataFrame(self.inner.budget.clone())
    }

    #[getter]
    fn schedule(&self) -> PyDataFrame {
        PyDataFrame(self.inner.schedule.clone())
    }

    // ── Totals and report ───────────────────────────────────────────────────

    #[getter]
    fn total_cost(&self) -> PyResult<f64> {
        Ok(self.inner.total_cost()?)
    }

    fn summary_text(&self) -> PyResult<String> {
        Ok(PlanSummary::from_plan(&self.inner)?.to_string())
    }

    fn summary_json(&self) -> PyResult<String> {
        let summary = PlanSummary::from_plan(&self.inner)?;
        serde_json::to_string(&summary).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    // ── Export ──────────────────────────────────────────────────────────────

    /// Multi-sheet workbook as bytes, e.g. for `st.download_button`.
    fn to_xlsx_bytes<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let buf = workbook::plan_to_xlsx_bytes(&self.inner)?;
        Ok(PyBytes::new(py, &buf))
    }

    fn write_xlsx(&self, path: PathBuf) -> PyResult<()> {
        workbook::write_plan(&self.inner, &path)?;
        Ok(())
    }
}

/// Load a BOQ table from an Excel workbook or CSV file.
#[pyfunction]
#[pyo3(signature = (path, sheet=None))]
fn load_table(path: PathBuf, sheet: Option<&str>) -> PyResult<PyDataFrame> {
    Ok(PyDataFrame(workbook::load_table(&path, sheet)?))
}

/// Validate and derive a plan.
///
/// `margin_percent` and `start_date` enable the pricing/calendar overlay and
/// must be given together.
#[pyfunction]
#[pyo3(signature = (table, margin_percent=None, start_date=None))]
fn plan(
    table: PyDataFrame,
    margin_percent: Option<f64>,
    start_date: Option<NaiveDate>,
) -> PyResult<PyProjectPlan> {
    let overlay = match (margin_percent, start_date) {
        (Some(margin_percent), Some(start_date)) => Some(Overlay {
            margin_percent,
            start_date,
        }),
        (None, None) => None,
        _ => {
            return Err(PyValueError::new_err(
                "margin_percent and start_date must be given together",
            ))
        }
    };

    let inner = crate::plan(table.0, &PlanOptions { overlay })?;
    Ok(PyProjectPlan { inner })
}

#[pyfunction]
fn required_columns() -> Vec<&'static str> {
    boq::REQUIRED.to_vec()
}

/// Export column and sheet name constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Input columns
    let input = PyModule::new(m.py(), "boq")?;
    input.add("WORK_ITEM", boq::WORK_ITEM)?;
    input.add("UNIT", boq::UNIT)?;
    input.add("QUANTITY", boq::QUANTITY)?;
    input.add("DURATION", boq::DURATION)?;
    input.add("LABOR_TYPE", boq::LABOR_TYPE)?;
    input.add("PRODUCTIVITY", boq::PRODUCTIVITY)?;
    input.add("MATERIAL", boq::MATERIAL)?;
    input.add("MATERIAL_RATE", boq::MATERIAL_RATE)?;
    input.add("MATERIAL_COST_PER_UNIT", boq::MATERIAL_COST_PER_UNIT)?;
    input.add("LABOR_COST_PER_DAY", boq::LABOR_COST_PER_DAY)?;
    m.add_submodule(&input)?;

    // Derived columns
    let out = PyModule::new(m.py(), "derived")?;
    out.add("LABOR_DAYS_NEEDED", derived::LABOR_DAYS_NEEDED)?;
    out.add("WORKERS_NEEDED", derived::WORKERS_NEEDED)?;
    out.add("TOTAL_LABOR_COST", derived::TOTAL_LABOR_COST)?;
    out.add("TOTAL_MATERIAL_NEEDED", derived::TOTAL_MATERIAL_NEEDED)?;
    out.add("TOTAL_MATERIAL_COST", derived::TOTAL_MATERIAL_COST)?;
    out.add("TOTAL_COST", derived::TOTAL_COST)?;
    out.add("START_DAY", derived::START_DAY)?;
    out.add("END_DAY", derived::END_DAY)?;
    out.add("SALE_PRICE", overlay::SALE_PRICE)?;
    out.add("ACTUAL_START_DATE", overlay::ACTUAL_START_DATE)?;
    out.add("ACTUAL_END_DATE", overlay::ACTUAL_END_DATE)?;
    m.add_submodule(&out)?;

    // Sheets
    let sheet_names = PyModule::new(m.py(), "sheets")?;
    sheet_names.add("RAW_DATA", sheets::RAW_DATA)?;
    sheet_names.add("RESOURCE_PLAN", sheets::RESOURCE_PLAN)?;
    sheet_names.add("PROCUREMENT_PLAN", sheets::PROCUREMENT_PLAN)?;
    sheet_names.add("BUDGET_PLAN", sheets::BUDGET_PLAN)?;
    sheet_names.add("SCHEDULE", sheets::SCHEDULE)?;
    m.add_submodule(&sheet_names)?;

    Ok(())
}

#[pymodule]
#[pyo3(name = "_core")]
fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyProjectPlan>()?;
    m.add_function(wrap_pyfunction!(load_table, m)?)?;
    m.add_function(wrap_pyfunction!(plan, m)?)?;
    m.add_function(wrap_pyfunction!(required_columns, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}

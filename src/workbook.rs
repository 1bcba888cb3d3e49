//! Workbook loading and multi-sheet export.
//!
//! Loading accepts spreadsheet containers (`.xlsx`, `.xlsm`, `.xls`, `.ods`)
//! through calamine and plain CSV through the polars reader. Export writes
//! the plan views as one worksheet each through rust_xlsxwriter.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, info};

use crate::error::PlanError;
use crate::model::ProjectPlan;
use crate::schema::{canonical_header, sheets};

// ── Loading ─────────────────────────────────────────────────────────────────

/// Load a BOQ table from a workbook or CSV file.
///
/// `sheet` selects a worksheet by name; `None` takes the first one. It is
/// ignored for CSV input. Headers are normalised with [`normalize_headers`].
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<DataFrame, PlanError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let df = if is_csv {
        read_csv_as_strings(path)?
    } else {
        read_sheet(path, sheet)?
    };

    info!(path = %path.display(), rows = df.height(), columns = df.width(), "table loaded");
    normalize_headers(df)
}

/// Read a CSV file with all columns as String dtype.
fn read_csv_as_strings(path: &Path) -> Result<DataFrame, PlanError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<DataFrame, PlanError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| PlanError::SheetNotFound(wanted.to_string()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| PlanError::InvalidFormat("Workbook contains no sheets".to_string()))?,
    };

    debug!(sheet = %name, available = names.len(), "reading worksheet");
    let range = workbook.worksheet_range(&name)?;
    range_to_frame(&range)
}

/// Convert a cell range into a DataFrame; the first row is the header.
///
/// A column whose non-empty cells are all numeric becomes Float64, any other
/// column becomes String. Empty cells are nulls.
pub fn range_to_frame(range: &Range<Data>) -> Result<DataFrame, PlanError> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let mut columns: Vec<Column> = Vec::with_capacity(header.len());
    for (idx, head) in header.iter().enumerate() {
        let name = cell_text(head).unwrap_or_else(|| format!("column_{}", idx + 1));
        let cells: Vec<&Data> = body.iter().map(|r| r.get(idx).unwrap_or(&Data::Empty)).collect();

        let numeric = cells.iter().all(|c| matches!(c, Data::Empty) || cell_number(c).is_some());
        let column = if numeric {
            let values: Vec<Option<f64>> = cells.iter().map(|c| cell_number(c)).collect();
            Column::new(name.trim().into(), values)
        } else {
            let values: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
            Column::new(name.trim().into(), values)
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Error(e) => Some(format!("{:?}", e)),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Rename bilingual and legacy headers to their canonical names.
///
/// Whitespace is trimmed from every header. A header is only renamed when
/// its canonical name is not already taken; other columns are untouched.
pub fn normalize_headers(mut df: DataFrame) -> Result<DataFrame, PlanError> {
    let current: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.to_string())
        .collect();

    for name in &current {
        let trimmed = name.trim();
        let target = canonical_header(trimmed).unwrap_or(trimmed);
        if target != name && df.column(target).is_err() {
            debug!(from = %name, to = target, "header renamed");
            df.rename(name, target.into())?;
        }
    }
    Ok(df)
}

// ── Export ──────────────────────────────────────────────────────────────────

/// Build the multi-sheet plan workbook.
///
/// Sheets, in order: raw augmented data, resource plan, procurement plan,
/// budget plan, schedule.
pub fn plan_workbook(plan: &ProjectPlan) -> Result<Workbook, PlanError> {
    let mut workbook = Workbook::new();
    let frames = [
        &plan.derived,
        &plan.resources,
        &plan.procurement,
        &plan.budget,
        &plan.schedule,
    ];

    for (name, df) in sheets::ALL.iter().zip(frames) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name)?;
        write_frame(worksheet, df)?;
    }
    Ok(workbook)
}

pub fn write_plan(plan: &ProjectPlan, path: &Path) -> Result<(), PlanError> {
    let mut workbook = plan_workbook(plan)?;
    workbook.save(path)?;
    info!(path = %path.display(), "plan workbook written");
    Ok(())
}

/// Serialise the plan workbook to bytes, for download handlers.
pub fn plan_to_xlsx_bytes(plan: &ProjectPlan) -> Result<Vec<u8>, PlanError> {
    let mut workbook = plan_workbook(plan)?;
    Ok(workbook.save_to_buffer()?)
}

/// Write a DataFrame with a bold header row.
///
/// Numeric columns are written as numbers, everything else (dates included)
/// as text. Nulls are left blank.
fn write_frame(worksheet: &mut Worksheet, df: &DataFrame) -> Result<(), PlanError> {
    let header = Format::new().set_bold();

    for (c, column) in df.get_columns().iter().enumerate() {
        let col_idx = c as u16;
        worksheet.write_string_with_format(0, col_idx, column.name().as_str(), &header)?;

        if is_numeric(column.dtype()) {
            let values = column.cast(&DataType::Float64)?;
            for (r, v) in values.f64()?.into_iter().enumerate() {
                if let Some(v) = v {
                    worksheet.write_number(r as u32 + 1, col_idx, v)?;
                }
            }
        } else {
            let values = column.cast(&DataType::String)?;
            for (r, v) in values.str()?.into_iter().enumerate() {
                if let Some(v) = v {
                    worksheet.write_string(r as u32 + 1, col_idx, v)?;
                }
            }
        }
    }
    Ok(())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_columns_typed_by_content() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("Work Item / بند العمل".into()));
        range.set_value((0, 1), Data::String("Quantity".into()));
        range.set_value((0, 2), Data::String("Notes".into()));
        range.set_value((1, 0), Data::String("Plaster".into()));
        range.set_value((1, 1), Data::Float(12.5));
        range.set_value((1, 2), Data::Int(3));
        range.set_value((2, 0), Data::Int(7));
        range.set_value((2, 1), Data::Int(4));
        range.set_value((2, 2), Data::String("rush".into()));

        let df = range_to_frame(&range).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("Quantity").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Notes").unwrap().dtype(), &DataType::String);

        let items: Vec<_> = df
            .column("Work Item / بند العمل")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(items, vec![Some("Plaster"), Some("7")]);
    }

    #[test]
    fn headers_normalised_without_clobbering() {
        let df = DataFrame::new(vec![
            Column::new(" Quantity / الكمية ".into(), [1.0]),
            Column::new("Duration (days) / المدة".into(), [2.0]),
            Column::new("Material Rate".into(), [3.0]),
            Column::new("Material Rate (per unit)".into(), [4.0]),
            Column::new("Remarks".into(), ["x"]),
        ])
        .unwrap();

        let df = normalize_headers(df).unwrap();
        let names: Vec<&str> = df.get_column_names_str();
        assert_eq!(
            names,
            vec!["Quantity", "Duration", "Material Rate", "Material Rate (per unit)", "Remarks"]
        );
    }
}

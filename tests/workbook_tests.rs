use std::fs;

use boq_planner::schema::{boq, derived, sheets};
use boq_planner::workbook::{load_table, plan_to_xlsx_bytes, write_plan};
use boq_planner::{plan, work_items_frame, PlanError, PlanOptions, WorkItemRow};
use calamine::{open_workbook, Data, Reader, Xlsx};
use tempfile::TempDir;

fn sample_plan() -> boq_planner::ProjectPlan {
    let rows = vec![
        WorkItemRow {
            work_item: "Foundation".into(),
            unit: "m3".into(),
            quantity: 100.0,
            duration_days: 5.0,
            labor_type: "Mason".into(),
            productivity: 10.0,
            material: "Concrete".into(),
            material_rate: 2.0,
            material_cost_per_unit: 3.0,
            labor_cost_per_day: 50.0,
        },
        WorkItemRow {
            work_item: "Columns".into(),
            unit: "m3".into(),
            quantity: 20.0,
            duration_days: 3.0,
            labor_type: "Mason".into(),
            productivity: 4.0,
            material: "Concrete".into(),
            material_rate: 1.0,
            material_cost_per_unit: 3.0,
            labor_cost_per_day: 50.0,
        },
    ];
    plan(work_items_frame(&rows).unwrap(), &PlanOptions::default()).unwrap()
}

#[test]
fn export_writes_five_named_sheets() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.xlsx");
    write_plan(&sample_plan(), &path).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), sheets::ALL.to_vec());

    let resources = workbook.worksheet_range(sheets::RESOURCE_PLAN).unwrap();
    assert_eq!(resources.get((0, 0)), Some(&Data::String(boq::LABOR_TYPE.into())));
    assert_eq!(resources.get((1, 0)), Some(&Data::String("Mason".into())));
    // 2 workers + 2 workers
    assert_eq!(resources.get((1, 1)), Some(&Data::Float(4.0)));
    assert_eq!(resources.height(), 2);

    let schedule = workbook.worksheet_range(sheets::SCHEDULE).unwrap();
    assert_eq!(schedule.get((0, 1)), Some(&Data::String(derived::START_DAY.into())));
    assert_eq!(schedule.get((2, 1)), Some(&Data::Float(6.0)));
    assert_eq!(schedule.get((2, 2)), Some(&Data::Float(8.0)));
}

#[test]
fn exported_raw_data_reloads_as_valid_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.xlsx");
    let original = sample_plan();
    write_plan(&original, &path).unwrap();

    let raw = load_table(&path, Some(sheets::RAW_DATA)).unwrap();
    let again = plan(raw, &PlanOptions::default()).unwrap();
    assert_eq!(again.total_cost().unwrap(), original.total_cost().unwrap());
}

#[test]
fn buffer_export_is_a_zip_container() {
    let bytes = plan_to_xlsx_bytes(&sample_plan()).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn unknown_sheet_is_reported_by_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.xlsx");
    write_plan(&sample_plan(), &path).unwrap();

    match load_table(&path, Some("BOQ 2024")) {
        Err(PlanError::SheetNotFound(name)) => assert_eq!(name, "BOQ 2024"),
        other => panic!("expected SheetNotFound, got {other:?}"),
    }
}

#[test]
fn csv_input_is_coerced_during_derivation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("boq.csv");
    fs::write(
        &path,
        "Work Item,Unit,Quantity,Duration (days),Labor Type,Productivity,Material,\
         Material Rate,Material Cost per Unit,Labor Cost per Day\n\
         Tiling,m2,100,5,Tiler,10,Tiles,2,3,50\n",
    )
    .unwrap();

    let raw = load_table(&path, None).unwrap();
    let project = plan(raw, &PlanOptions::default()).unwrap();
    assert_eq!(project.total_cost().unwrap(), 1100.0);
}

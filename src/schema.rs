/// Column-name constants for boq-planner tables.
/// Single source of truth - exported to Python via PyO3.

// ── Bill-of-quantities input columns ───────────────────────────────────────
pub mod boq {
    pub const WORK_ITEM: &str = "Work Item";
    pub const UNIT: &str = "Unit";
    pub const QUANTITY: &str = "Quantity";
    pub const DURATION: &str = "Duration";
    pub const LABOR_TYPE: &str = "Labor Type";
    pub const PRODUCTIVITY: &str = "Productivity";
    pub const MATERIAL: &str = "Material";
    pub const MATERIAL_RATE: &str = "Material Rate";
    pub const MATERIAL_COST_PER_UNIT: &str = "Material Cost per Unit";
    pub const LABOR_COST_PER_DAY: &str = "Labor Cost per Day";

    /// Required columns, in the order missing ones are reported.
    pub const REQUIRED: [&str; 10] = [
        WORK_ITEM,
        UNIT,
        QUANTITY,
        DURATION,
        LABOR_TYPE,
        PRODUCTIVITY,
        MATERIAL,
        MATERIAL_RATE,
        MATERIAL_COST_PER_UNIT,
        LABOR_COST_PER_DAY,
    ];

    pub const NUMERIC: [&str; 6] = [
        QUANTITY,
        DURATION,
        PRODUCTIVITY,
        MATERIAL_RATE,
        MATERIAL_COST_PER_UNIT,
        LABOR_COST_PER_DAY,
    ];

    pub const IDENTIFIERS: [&str; 4] = [WORK_ITEM, UNIT, LABOR_TYPE, MATERIAL];

    /// Long-form headers found in older BOQ templates.
    pub const ALIASES: [(&str, &str); 3] = [
        ("Duration (days)", DURATION),
        ("Productivity (Unit/Day/Worker)", PRODUCTIVITY),
        ("Material Rate (per unit)", MATERIAL_RATE),
    ];

    /// Separator between the English header and its translation.
    pub const BILINGUAL_SEPARATOR: &str = " / ";
}

// ── Derived columns ─────────────────────────────────────────────────────────
pub mod derived {
    pub const LABOR_DAYS_NEEDED: &str = "Labor Days Needed";
    pub const WORKERS_NEEDED: &str = "Workers Needed";
    pub const TOTAL_LABOR_COST: &str = "Total Labor Cost";
    pub const TOTAL_MATERIAL_NEEDED: &str = "Total Material Needed";
    pub const TOTAL_MATERIAL_COST: &str = "Total Material Cost";
    pub const TOTAL_COST: &str = "Total Cost";
    pub const START_DAY: &str = "Start Day";
    pub const END_DAY: &str = "End Day";

    pub const ALL: [&str; 8] = [
        LABOR_DAYS_NEEDED,
        WORKERS_NEEDED,
        TOTAL_LABOR_COST,
        TOTAL_MATERIAL_NEEDED,
        TOTAL_MATERIAL_COST,
        TOTAL_COST,
        START_DAY,
        END_DAY,
    ];
}

// ── Pricing / calendar overlay ──────────────────────────────────────────────
pub mod overlay {
    pub const SALE_PRICE: &str = "Sale Price";
    pub const ACTUAL_START_DATE: &str = "Actual Start Date";
    pub const ACTUAL_END_DATE: &str = "Actual End Date";

    pub const ALL: [&str; 3] = [SALE_PRICE, ACTUAL_START_DATE, ACTUAL_END_DATE];
}

// ── Export sheet names ──────────────────────────────────────────────────────
pub mod sheets {
    pub const RAW_DATA: &str = "Raw Data";
    pub const RESOURCE_PLAN: &str = "Resource Plan";
    pub const PROCUREMENT_PLAN: &str = "Procurement Plan";
    pub const BUDGET_PLAN: &str = "Budget Plan";
    pub const SCHEDULE: &str = "Schedule";

    pub const ALL: [&str; 5] = [
        RAW_DATA,
        RESOURCE_PLAN,
        PROCUREMENT_PLAN,
        BUDGET_PLAN,
        SCHEDULE,
    ];
}

/// Map a raw header onto its canonical name, if it has one.
///
/// Accepts the canonical name itself, a bilingual `"English / ..."` header
/// and the legacy long-form headers in [`boq::ALIASES`].
pub fn canonical_header(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    let english = trimmed
        .split(boq::BILINGUAL_SEPARATOR)
        .next()
        .unwrap_or(trimmed)
        .trim();

    boq::REQUIRED
        .iter()
        .copied()
        .find(|name| *name == english)
        .or_else(|| {
            boq::ALIASES
                .iter()
                .find(|(alias, _)| *alias == english)
                .map(|(_, name)| *name)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilingual_headers_resolve_to_english_name() {
        assert_eq!(canonical_header("Quantity / الكمية"), Some(boq::QUANTITY));
        assert_eq!(
            canonical_header("  Labor Cost per Day / تكلفة العامل لليوم "),
            Some(boq::LABOR_COST_PER_DAY)
        );
    }

    #[test]
    fn legacy_headers_resolve_through_aliases() {
        assert_eq!(
            canonical_header("Duration (days) / المدة"),
            Some(boq::DURATION)
        );
        assert_eq!(
            canonical_header("Productivity (Unit/Day/Worker)"),
            Some(boq::PRODUCTIVITY)
        );
    }

    #[test]
    fn unknown_headers_are_left_alone() {
        assert_eq!(canonical_header("Notes"), None);
        assert_eq!(canonical_header("quantity"), None);
    }
}

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::PlanError;
use crate::model::ProjectPlan;

/// Print-style summary handed to report writers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub items: Vec<CostLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLine {
    pub work_item: String,
    pub total_cost: f64,
}

impl PlanSummary {
    pub fn from_plan(plan: &ProjectPlan) -> Result<Self, PlanError> {
        let items = plan
            .cost_lines()?
            .into_iter()
            .map(|(work_item, total_cost)| CostLine {
                work_item,
                total_cost,
            })
            .collect();

        Ok(Self {
            total_cost: plan.total_cost()?,
            start_date: plan.start_date,
            items,
        })
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project Plan Report")?;
        writeln!(f, "Total Cost: {:.2}", self.total_cost)?;
        if let Some(date) = self.start_date {
            writeln!(f, "Start Date: {}", date)?;
        }
        writeln!(f)?;
        for line in &self.items {
            writeln!(f, "- {}: {:.2}", line.work_item, line.total_cost)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_total_start_date_and_lines() {
        let summary = PlanSummary {
            total_cost: 1234.5,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            items: vec![
                CostLine {
                    work_item: "Excavation".into(),
                    total_cost: 1000.0,
                },
                CostLine {
                    work_item: "Backfill".into(),
                    total_cost: 234.5,
                },
            ],
        };

        assert_eq!(
            summary.to_string(),
            "Project Plan Report\n\
             Total Cost: 1234.50\n\
             Start Date: 2025-03-01\n\
             \n\
             - Excavation: 1000.00\n\
             - Backfill: 234.50\n"
        );
    }

    #[test]
    fn json_omits_missing_start_date() {
        let summary = PlanSummary {
            total_cost: 0.0,
            start_date: None,
            items: vec![],
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"total_cost":0.0,"items":[]}"#);
    }
}

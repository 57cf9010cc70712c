//! Business parameter snapshot driving every projection

use serde::{Deserialize, Serialize};

/// Operating metrics entered by the user
///
/// Values are not validated: negative inputs flow straight into the
/// calculations. `current_cash` is assumed non-negative by callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessParameters {
    /// Cash on hand at projection start
    pub current_cash: f64,
    /// Current-month revenue baseline (before growth)
    pub monthly_revenue: f64,
    /// Catch-all expenses outside headcount and budgets
    pub monthly_expenses: f64,
    /// Annualized revenue growth in percent, negative for decline
    pub growth_rate: f64,
    pub team_size: u32,
    pub average_salary: f64,
    pub marketing_budget: f64,
    pub operational_expenses: f64,
}

impl Default for BusinessParameters {
    fn default() -> Self {
        Self {
            current_cash: 500_000.0,
            monthly_revenue: 50_000.0,
            monthly_expenses: 35_000.0,
            growth_rate: 15.0,
            team_size: 8,
            average_salary: 8_000.0,
            marketing_budget: 10_000.0,
            operational_expenses: 15_000.0,
        }
    }
}

impl BusinessParameters {
    /// Merge a partial update into this snapshot (last write wins per field)
    pub fn apply(&mut self, update: &ParameterUpdate) {
        if let Some(v) = update.current_cash {
            self.current_cash = v;
        }
        if let Some(v) = update.monthly_revenue {
            self.monthly_revenue = v;
        }
        if let Some(v) = update.monthly_expenses {
            self.monthly_expenses = v;
        }
        if let Some(v) = update.growth_rate {
            self.growth_rate = v;
        }
        if let Some(v) = update.team_size {
            self.team_size = v;
        }
        if let Some(v) = update.average_salary {
            self.average_salary = v;
        }
        if let Some(v) = update.marketing_budget {
            self.marketing_budget = v;
        }
        if let Some(v) = update.operational_expenses {
            self.operational_expenses = v;
        }
    }

    /// Monthly headcount cost
    pub fn salary_cost(&self) -> f64 {
        f64::from(self.team_size) * self.average_salary
    }
}

/// Partial update of [`BusinessParameters`]; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_cash: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_expenses: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operational_expenses: Option<f64>,
}

impl ParameterUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Update that overwrites every field with the given snapshot
    pub fn from_parameters(params: &BusinessParameters) -> Self {
        Self {
            current_cash: Some(params.current_cash),
            monthly_revenue: Some(params.monthly_revenue),
            monthly_expenses: Some(params.monthly_expenses),
            growth_rate: Some(params.growth_rate),
            team_size: Some(params.team_size),
            average_salary: Some(params.average_salary),
            marketing_budget: Some(params.marketing_budget),
            operational_expenses: Some(params.operational_expenses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut params = BusinessParameters::default();
        params.apply(&ParameterUpdate {
            monthly_revenue: Some(60_000.0),
            team_size: Some(10),
            ..Default::default()
        });

        assert_eq!(params.monthly_revenue, 60_000.0);
        assert_eq!(params.team_size, 10);
        assert_eq!(params.current_cash, 500_000.0);
        assert_eq!(params.marketing_budget, 10_000.0);
    }

    #[test]
    fn test_last_write_wins() {
        let mut params = BusinessParameters::default();
        params.apply(&ParameterUpdate {
            growth_rate: Some(5.0),
            ..Default::default()
        });
        params.apply(&ParameterUpdate {
            growth_rate: Some(-10.0),
            ..Default::default()
        });
        assert_eq!(params.growth_rate, -10.0);
    }

    #[test]
    fn test_partial_json_uses_camel_case() {
        let update = ParameterUpdate {
            current_cash: Some(1.0),
            ..Default::default()
        };
        let json = serde_json::to_value(update).unwrap();
        assert_eq!(json, serde_json::json!({ "currentCash": 1.0 }));
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let params: BusinessParameters =
            serde_json::from_value(serde_json::json!({ "teamSize": 3 })).unwrap();
        assert_eq!(params.team_size, 3);
        assert_eq!(params.average_salary, 8_000.0);
    }

    #[test]
    fn test_from_parameters_round_trips_through_apply() {
        let source = BusinessParameters {
            current_cash: 1.0,
            monthly_revenue: 2.0,
            monthly_expenses: 3.0,
            growth_rate: 4.0,
            team_size: 5,
            average_salary: 6.0,
            marketing_budget: 7.0,
            operational_expenses: 8.0,
        };
        let mut target = BusinessParameters::default();
        target.apply(&ParameterUpdate::from_parameters(&source));
        assert_eq!(target, source);
        assert!(ParameterUpdate::default().is_empty());
    }
}

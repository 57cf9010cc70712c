//! Categorized monthly expense breakdown
//!
//! Collapses the parameter snapshot into the four expense categories shown on
//! every page. Stateless: the breakdown is recomputed on each call.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::params::BusinessParameters;

/// Expense category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Salaries,
    Marketing,
    Operations,
    OtherExpenses,
}

impl ExpenseCategory {
    /// Every category, in display order
    pub const ALL: [ExpenseCategory; 4] = [
        ExpenseCategory::Salaries,
        ExpenseCategory::Marketing,
        ExpenseCategory::Operations,
        ExpenseCategory::OtherExpenses,
    ];

    /// Chart color for this category
    pub fn color(&self) -> &'static str {
        match self {
            ExpenseCategory::Salaries => constants::COLOR_BLUE,
            ExpenseCategory::Marketing => constants::COLOR_GREEN,
            ExpenseCategory::Operations => constants::COLOR_AMBER,
            ExpenseCategory::OtherExpenses => constants::COLOR_RED,
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseCategory::Salaries => write!(f, "Salaries"),
            ExpenseCategory::Marketing => write!(f, "Marketing"),
            ExpenseCategory::Operations => write!(f, "Operations"),
            ExpenseCategory::OtherExpenses => write!(f, "Other Expenses"),
        }
    }
}

/// One category of the monthly expense breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpenseBreakdown {
    pub category: ExpenseCategory,
    pub amount: f64,
    /// Display hint only
    pub color: &'static str,
}

/// Break the monthly expenses down by category
///
/// Always exactly four entries, in [`ExpenseCategory::ALL`] order.
pub fn breakdown(params: &BusinessParameters) -> [ExpenseBreakdown; 4] {
    ExpenseCategory::ALL.map(|category| ExpenseBreakdown {
        category,
        amount: category_amount(params, category),
        color: category.color(),
    })
}

/// Total monthly expenses across all categories
pub fn total_expenses(params: &BusinessParameters) -> f64 {
    breakdown(params).iter().map(|e| e.amount).sum()
}

fn category_amount(params: &BusinessParameters, category: ExpenseCategory) -> f64 {
    match category {
        ExpenseCategory::Salaries => params.salary_cost(),
        ExpenseCategory::Marketing => params.marketing_budget,
        ExpenseCategory::Operations => params.operational_expenses,
        ExpenseCategory::OtherExpenses => params.monthly_expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_default_parameters() {
        let entries = breakdown(&BusinessParameters::default());

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].category, ExpenseCategory::Salaries);
        assert_eq!(entries[0].amount, 64_000.0);
        assert_eq!(entries[1].amount, 10_000.0);
        assert_eq!(entries[2].amount, 15_000.0);
        assert_eq!(entries[3].amount, 35_000.0);
        assert_eq!(entries[3].color, "#EF4444");
    }

    #[test]
    fn test_total_matches_breakdown_sum() {
        let params = BusinessParameters {
            team_size: 3,
            average_salary: 4_500.0,
            marketing_budget: 1_250.0,
            operational_expenses: 800.0,
            monthly_expenses: 99.5,
            ..Default::default()
        };
        let sum: f64 = breakdown(&params).iter().map(|e| e.amount).sum();
        assert_eq!(total_expenses(&params), sum);
        assert_eq!(sum, 13_500.0 + 1_250.0 + 800.0 + 99.5);
    }

    #[test]
    fn test_negative_inputs_pass_through() {
        let params = BusinessParameters {
            marketing_budget: -500.0,
            ..Default::default()
        };
        assert_eq!(breakdown(&params)[1].amount, -500.0);
    }

    #[test]
    fn test_empty_team_has_no_salary_cost() {
        let params = BusinessParameters {
            team_size: 0,
            ..Default::default()
        };
        assert_eq!(breakdown(&params)[0].amount, 0.0);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ExpenseCategory::OtherExpenses.to_string(), "Other Expenses");
        assert_eq!(ExpenseCategory::Operations.to_string(), "Operations");
    }
}

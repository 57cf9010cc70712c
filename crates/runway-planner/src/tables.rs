//! Console tables for list-style commands

use runway_engine::expenses::ExpenseBreakdown;
use runway_engine::revenue::RevenueStream;
use runway_engine::runway::Milestone;
use runway_engine::team::{DepartmentStats, TeamMember};
use runway_engine::{BusinessParameters, ScenarioResult};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "Parameter")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct ProjectionRow {
    #[tabled(rename = "Month")]
    month: u32,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Expenses")]
    expenses: String,
    #[tabled(rename = "Cash Balance")]
    cash_balance: String,
    #[tabled(rename = "Runway")]
    runway: String,
}

#[derive(Tabled)]
struct BreakdownRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Share")]
    share: String,
}

#[derive(Tabled)]
struct StreamRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Monthly")]
    monthly_revenue: String,
    #[tabled(rename = "Customers")]
    customers: u32,
    #[tabled(rename = "Growth")]
    growth_rate: String,
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Salary")]
    salary: String,
    #[tabled(rename = "Equity")]
    equity: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct DepartmentRow {
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Members")]
    count: u32,
    #[tabled(rename = "Salary Cost")]
    total_salary: String,
}

#[derive(Tabled)]
struct MilestoneRow {
    #[tabled(rename = "Month")]
    month: u32,
    #[tabled(rename = "Milestone")]
    title: &'static str,
    #[tabled(rename = "Status")]
    status: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn parameters(params: &BusinessParameters) -> String {
    render(vec![
        ParameterRow { name: "Current cash", value: money(params.current_cash) },
        ParameterRow { name: "Monthly revenue", value: money(params.monthly_revenue) },
        ParameterRow { name: "Other monthly expenses", value: money(params.monthly_expenses) },
        ParameterRow { name: "Annual growth rate", value: format!("{:.1}%", params.growth_rate) },
        ParameterRow { name: "Team size", value: params.team_size.to_string() },
        ParameterRow { name: "Average salary", value: money(params.average_salary) },
        ParameterRow { name: "Marketing budget", value: money(params.marketing_budget) },
        ParameterRow { name: "Operational expenses", value: money(params.operational_expenses) },
    ])
}

pub fn projection(results: &[ScenarioResult]) -> String {
    render(
        results
            .iter()
            .map(|r| ProjectionRow {
                month: r.month,
                revenue: format!("{:.0}", r.revenue),
                expenses: format!("{:.0}", r.expenses),
                cash_balance: format!("{:.0}", r.cash_balance),
                runway: format!("{:.1}", r.runway_months),
            })
            .collect(),
    )
}

pub fn breakdown(items: &[ExpenseBreakdown], total: f64) -> String {
    render(
        items
            .iter()
            .map(|e| BreakdownRow {
                category: e.category.to_string(),
                amount: money(e.amount),
                share: if total == 0.0 {
                    "-".to_string()
                } else {
                    format!("{:.1}%", e.amount / total * 100.0)
                },
            })
            .collect(),
    )
}

pub fn streams(streams: &[RevenueStream]) -> String {
    render(
        streams
            .iter()
            .map(|s| StreamRow {
                id: s.id.clone(),
                name: s.fields.name.clone(),
                kind: s.fields.kind.to_string(),
                monthly_revenue: money(s.fields.monthly_revenue),
                customers: s.fields.customers,
                growth_rate: format!("{:.1}%", s.fields.growth_rate),
            })
            .collect(),
    )
}

pub fn members(members: &[TeamMember]) -> String {
    render(
        members
            .iter()
            .map(|m| MemberRow {
                id: m.id.clone(),
                name: m.fields.name.clone(),
                role: m.fields.role.clone(),
                department: m.fields.department.clone(),
                salary: money(m.fields.salary),
                equity: format!("{:.2}%", m.fields.equity),
                status: m.fields.status.to_string(),
            })
            .collect(),
    )
}

pub fn departments(stats: &[DepartmentStats]) -> String {
    render(
        stats
            .iter()
            .map(|d| DepartmentRow {
                department: d.department.clone(),
                count: d.count,
                total_salary: money(d.total_salary),
            })
            .collect(),
    )
}

pub fn milestones(milestones: &[Milestone]) -> String {
    render(
        milestones
            .iter()
            .map(|m| MilestoneRow {
                month: m.month,
                title: m.title,
                status: format!("{:?}", m.status),
            })
            .collect(),
    )
}

//! Report generation (CSV outputs and console summary)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::Writer;
use runway_engine::runway::{self, RunwayOutlook};
use runway_engine::{ReportInput, ReportRenderer, revenue, scenario};
use std::path::{Path, PathBuf};

use crate::constants;

/// Writes the projection, expense breakdown and summary CSVs
pub struct CsvReport<'a> {
    pub output_dir: &'a Path,
    /// Reference date for the cash-out estimate
    pub today: NaiveDate,
}

impl ReportRenderer for CsvReport<'_> {
    type Output = Vec<PathBuf>;
    type Error = anyhow::Error;

    fn render(&self, input: &ReportInput) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(self.output_dir).with_context(|| {
            format!("Failed to create output dir {}", self.output_dir.display())
        })?;

        Ok(vec![
            generate_projection(self.output_dir, input)?,
            generate_expense_breakdown(self.output_dir, input)?,
            generate_summary(self.output_dir, input, self.today)?,
        ])
    }
}

/// Generate projection.csv
fn generate_projection(output_dir: &Path, input: &ReportInput) -> Result<PathBuf> {
    let path = output_dir.join(constants::PROJECTION_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Month",
        "Revenue",
        "Expenses",
        "Net_Cash_Flow",
        "Cash_Balance",
        "Runway_Months",
    ])?;

    for r in &input.results {
        wtr.write_record([
            r.month.to_string(),
            format!("{:.0}", r.revenue),
            format!("{:.0}", r.expenses),
            format!("{:.0}", r.revenue - r.expenses),
            format!("{:.0}", r.cash_balance),
            format!("{:.1}", r.runway_months),
        ])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Generate expense_breakdown.csv
fn generate_expense_breakdown(output_dir: &Path, input: &ReportInput) -> Result<PathBuf> {
    let path = output_dir.join(constants::EXPENSE_BREAKDOWN_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Category", "Amount", "Share_Percent", "Color"])?;

    for item in &input.breakdown {
        wtr.write_record([
            item.category.to_string(),
            format!("{:.2}", item.amount),
            format!("{:.1}", share_percent(item.amount, input.total_expenses)),
            item.color.to_string(),
        ])?;
    }

    wtr.write_record([
        "Total".to_string(),
        format!("{:.2}", input.total_expenses),
        "100.0".to_string(),
        String::new(),
    ])?;

    wtr.flush()?;
    Ok(path)
}

/// Generate summary.csv (one metric per row)
fn generate_summary(output_dir: &Path, input: &ReportInput, today: NaiveDate) -> Result<PathBuf> {
    let path = output_dir.join(constants::SUMMARY_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Metric", "Value"])?;
    for (metric, value) in summary_rows(input, today) {
        wtr.write_record([metric, value.as_str()])?;
    }

    wtr.flush()?;
    Ok(path)
}

/// Metric/value pairs shared by summary.csv and tests
fn summary_rows(input: &ReportInput, today: NaiveDate) -> Vec<(&'static str, String)> {
    let p = &input.parameters;
    let runway = input.runway_months;

    vec![
        ("Generated_At", input.generated_at.to_rfc3339()),
        ("Current_Cash", format!("{:.2}", p.current_cash)),
        ("Monthly_Revenue", format!("{:.2}", p.monthly_revenue)),
        ("Total_Monthly_Expenses", format!("{:.2}", input.total_expenses)),
        ("Net_Burn", format!("{:.2}", runway::net_burn(p))),
        ("Growth_Rate_Percent", format!("{:.1}", p.growth_rate)),
        (
            "Runway_Months",
            if runway.is_finite() {
                format!("{:.1}", runway)
            } else {
                "infinite".to_string()
            },
        ),
        (
            "Cash_Out_Date",
            runway::cash_out_date(runway, today)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ),
        ("Runway_Outlook", RunwayOutlook::from_runway(runway).to_string()),
        (
            "Depletion_Month",
            scenario::depletion_month(&input.results)
                .map(|m| m.to_string())
                .unwrap_or_default(),
        ),
        ("Health_Score", input.health.score.to_string()),
        ("Health_Status", input.health.status.to_string()),
        ("Revenue_Streams", input.revenue.stream_count.to_string()),
        ("Stream_Revenue", format!("{:.2}", input.revenue.total_revenue)),
        (
            "Weighted_Growth_Percent",
            format!("{:.1}", input.revenue.average_growth_rate),
        ),
        (
            "Revenue_Per_Customer",
            format!("{:.2}", input.revenue.average_revenue_per_customer),
        ),
        ("Active_Team_Members", input.team.active_members.to_string()),
        ("Team_Salary_Cost", format!("{:.2}", input.team.total_salary_cost)),
    ]
}

fn share_percent(amount: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { amount / total * 100.0 }
}

/// Print the report summary to the console
pub fn print_summary(input: &ReportInput, title: &str, today: NaiveDate) {
    let p = &input.parameters;
    let runway = input.runway_months;

    println!("\n============================================================");
    println!("  {}", title);
    println!("============================================================\n");

    println!("CASH POSITION");
    println!("  Current cash:        ${:>14.2}", p.current_cash);
    println!("  Monthly revenue:     ${:>14.2}", p.monthly_revenue);
    println!("  Monthly expenses:    ${:>14.2}", input.total_expenses);
    println!("  Net burn:            ${:>14.2}", runway::net_burn(p));
    println!();

    println!("RUNWAY");
    println!("  Runway:              {}", runway::format_runway(runway));
    println!("  Outlook:             {}", RunwayOutlook::from_runway(runway));
    if let Some(date) = runway::cash_out_date(runway, today) {
        println!("  Cash-out estimate:   {}", date.format("%Y-%m-%d"));
    }
    match scenario::depletion_month(&input.results) {
        Some(month) => println!("  Projection:          cash depleted in month {}", month),
        None => println!(
            "  Projection:          cash positive through month {}",
            input.results.last().map(|r| r.month).unwrap_or_default()
        ),
    }
    println!(
        "  Health:              {}/100 ({})",
        input.health.score, input.health.status
    );
    println!();

    println!("MILESTONES");
    for m in runway::milestones(runway) {
        println!("  Month {:>2}  {:<22} {:?}", m.month, m.title, m.status);
    }
    println!();

    println!("REVENUE TARGETS");
    for t in revenue::revenue_targets(input.revenue.total_revenue) {
        println!(
            "  {:<13} ${:>12.2} of ${:>12.2}  {}",
            t.period,
            t.actual,
            t.target,
            if t.achieved { "achieved" } else { "" }
        );
    }
    println!("\n============================================================\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use runway_engine::Planner;

    fn report_input() -> ReportInput {
        let mut planner = Planner::standalone();
        planner.prepare_report()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    #[test]
    fn test_render_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = CsvReport {
            output_dir: dir.path(),
            today: today(),
        };

        let paths = report.render(&report_input()).unwrap();

        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_projection_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate_projection(dir.path(), &report_input()).unwrap();

        let mut rdr = csv::Reader::from_path(path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 7);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][4], "426000");
        assert_eq!(&rows[0][5], "5.8");
        assert_eq!(&rows[6][4], "-5456");
    }

    #[test]
    fn test_expense_breakdown_shares() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate_expense_breakdown(dir.path(), &report_input()).unwrap();

        let mut rdr = csv::Reader::from_path(path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 5);
        assert_eq!(&rows[0][0], "Salaries");
        assert_eq!(&rows[0][1], "64000.00");
        assert_eq!(&rows[4][1], "124000.00");
    }

    #[test]
    fn test_summary_rows() {
        let rows = summary_rows(&report_input(), today());
        let get = |name: &str| {
            rows.iter()
                .find(|(metric, _)| *metric == name)
                .map(|(_, value)| value.clone())
                .unwrap()
        };

        assert_eq!(get("Runway_Months"), "6.8");
        assert_eq!(get("Net_Burn"), "74000.00");
        assert_eq!(get("Depletion_Month"), "6");
        assert_eq!(get("Health_Score"), "45");
        // 203 days after the reference date
        assert_eq!(get("Cash_Out_Date"), "2026-07-23");
    }

    #[test]
    fn test_profitable_summary_has_no_cash_out_date() {
        let mut planner = Planner::standalone();
        planner.update_parameters(runway_engine::ParameterUpdate {
            monthly_revenue: Some(200_000.0),
            ..Default::default()
        });
        let rows = summary_rows(&planner.prepare_report(), today());

        assert!(rows.contains(&("Runway_Months", "infinite".to_string())));
        assert!(rows.contains(&("Cash_Out_Date", String::new())));
        assert!(rows.contains(&("Depletion_Month", String::new())));
    }

    #[test]
    fn test_share_percent_of_zero_total() {
        assert_eq!(share_percent(10.0, 0.0), 0.0);
        assert_eq!(share_percent(25.0, 100.0), 25.0);
    }
}

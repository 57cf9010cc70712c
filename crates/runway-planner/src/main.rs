//! Runway Planner
//!
//! Models a startup's cash position from a handful of business parameters:
//! month-by-month projection, runway, health score, revenue streams and team
//! cost. State is kept per user in a local SQLite database.

mod config;
mod constants;
mod reports;
mod store;
mod tables;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use runway_engine::revenue::{self, NewRevenueStream, RevenueStreamKind, RevenueStreamUpdate};
use runway_engine::runway::{self, RunwayOutlook};
use runway_engine::team::{self, MemberStatus, NewTeamMember};
use runway_engine::{Mode, NullStore, ParameterUpdate, Planner, ReportRenderer, Store, scenario};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::{Config, FileConfig};
use reports::CsvReport;
use store::SqliteStore;

#[derive(Parser, Debug)]
#[command(name = "runway-planner")]
#[command(about = "Cash runway and scenario planning for early-stage companies")]
struct Args {
    /// Data directory for the database
    #[arg(short, long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Output directory for generated CSV reports
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: PathBuf,

    /// Config file path
    #[arg(short, long, default_value = constants::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// User whose data is loaded and saved (overrides config)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Use sample data; nothing is saved
    #[arg(long, global = true)]
    demo: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// View or change business parameters
    Params {
        #[command(subcommand)]
        action: ParamsCommand,
    },

    /// Project cash month by month
    Project,

    /// Runway analysis: alerts, milestones and expense breakdown
    Runway,

    /// Manage revenue streams
    Stream {
        #[command(subcommand)]
        action: StreamCommand,
    },

    /// Manage the team
    Team {
        #[command(subcommand)]
        action: TeamCommand,
    },

    /// Write CSV reports and print a summary
    Report,

    /// Show usage counters
    Usage,
}

#[derive(Subcommand, Debug)]
enum ParamsCommand {
    /// Show current parameters
    Show,

    /// Change one or more parameters
    Set {
        #[arg(long)]
        current_cash: Option<f64>,

        #[arg(long)]
        monthly_revenue: Option<f64>,

        /// Monthly expenses outside salaries, marketing and operations
        #[arg(long)]
        monthly_expenses: Option<f64>,

        /// Annual revenue growth rate in percent
        #[arg(long, allow_negative_numbers = true)]
        growth_rate: Option<f64>,

        #[arg(long)]
        team_size: Option<u32>,

        /// Monthly salary per team member
        #[arg(long)]
        average_salary: Option<f64>,

        #[arg(long)]
        marketing_budget: Option<f64>,

        #[arg(long)]
        operational_expenses: Option<f64>,
    },

    /// Restore default parameters
    Reset,
}

#[derive(Subcommand, Debug)]
enum StreamCommand {
    /// List revenue streams with totals and targets
    List,

    /// Add a revenue stream
    Add {
        #[arg(long)]
        name: String,

        /// Type: subscription, one-time, usage-based, commission
        #[arg(long = "type", default_value = "subscription")]
        kind: RevenueStreamKind,

        #[arg(long)]
        monthly_revenue: f64,

        #[arg(long, default_value_t = 0)]
        customers: u32,

        /// Average value per customer (default: monthly revenue / customers)
        #[arg(long)]
        average_value: Option<f64>,

        /// Growth rate in percent
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        growth_rate: f64,

        /// Display color (hex)
        #[arg(long, default_value = runway_engine::constants::COLOR_BLUE)]
        color: String,
    },

    /// Update a revenue stream
    Update {
        /// Stream ID (or unique prefix)
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type")]
        kind: Option<RevenueStreamKind>,

        #[arg(long)]
        monthly_revenue: Option<f64>,

        #[arg(long)]
        customers: Option<u32>,

        #[arg(long)]
        average_value: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        growth_rate: Option<f64>,
    },

    /// Delete a revenue stream
    Delete {
        /// Stream ID (or unique prefix)
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum TeamCommand {
    /// List team members with department totals
    List,

    /// Add a team member
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        role: String,

        #[arg(long)]
        department: String,

        /// Monthly salary
        #[arg(long)]
        salary: f64,

        /// Start date (YYYY-MM-DD, default: today)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Equity percentage
        #[arg(long, default_value_t = 0.0)]
        equity: f64,
    },

    /// Mark a member active or inactive
    Status {
        /// Member ID (or unique prefix)
        id: String,

        /// active or inactive
        status: MemberStatus,
    },

    /// Remove a team member
    Delete {
        /// Member ID (or unique prefix)
        id: String,
    },
}

/// Install the tracing subscriber; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        constants::VERBOSE_LOG_FILTER
    } else {
        constants::DEFAULT_LOG_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Open the database when a user is set and storage is enabled
async fn open_store(config: &Config) -> Result<Option<Arc<SqliteStore>>> {
    match (&config.user_id, &config.database) {
        (Some(_), Some(path)) if !config.demo_mode => {
            let store = SqliteStore::open(path).await?;
            Ok(Some(Arc::new(store)))
        }
        _ => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let file_config = FileConfig::load_or_default(&args.config)?;
    let config = Config::from_file(&file_config, &args.data_dir, args.user.clone(), args.demo);
    tracing::debug!(?config, "configuration resolved");

    let sqlite = open_store(&config).await?;
    let store: Arc<dyn Store> = match &sqlite {
        Some(sqlite) => sqlite.clone(),
        None => Arc::new(NullStore),
    };

    let mut planner = Planner::new(store, config.user_id.clone());
    if config.demo_mode {
        planner.set_demo_mode(true).await;
    } else {
        planner.load().await;
    }

    let result = match args.command {
        Some(command) => {
            handle_command(command, &mut planner, &args.output_dir, &config, sqlite.as_deref())
                .await
        }
        // No subcommand - generate the report
        None => run_report(&mut planner, &args.output_dir, &config),
    };

    planner.flush().await;
    result
}

async fn handle_command(
    command: Command,
    planner: &mut Planner,
    output_dir: &std::path::Path,
    config: &Config,
    sqlite: Option<&SqliteStore>,
) -> Result<()> {
    match command {
        Command::Params { action } => handle_params_command(action, planner),
        Command::Project => show_projection(planner),
        Command::Runway => show_runway(planner),
        Command::Stream { action } => handle_stream_command(action, planner).await,
        Command::Team { action } => handle_team_command(action, planner).await,
        Command::Report => run_report(planner, output_dir, config),
        Command::Usage => show_usage(planner, sqlite).await,
    }
}

/// Handle parameter subcommands
fn handle_params_command(action: ParamsCommand, planner: &mut Planner) -> Result<()> {
    match action {
        ParamsCommand::Show => {
            print_session_banner(planner);
            println!("{}", tables::parameters(planner.parameters()));
            println!(
                "\nTotal monthly expenses: ${:.2}",
                planner.total_expenses()
            );
            println!(
                "Runway: {} ({})",
                runway::format_runway(planner.runway_months()),
                planner.runway_alert()
            );
            Ok(())
        }

        ParamsCommand::Set {
            current_cash,
            monthly_revenue,
            monthly_expenses,
            growth_rate,
            team_size,
            average_salary,
            marketing_budget,
            operational_expenses,
        } => {
            let update = ParameterUpdate {
                current_cash,
                monthly_revenue,
                monthly_expenses,
                growth_rate,
                team_size,
                average_salary,
                marketing_budget,
                operational_expenses,
            };
            if update.is_empty() {
                bail!("Nothing to update. Pass at least one parameter flag (see --help).");
            }

            planner.update_parameters(update);
            println!("Parameters updated.");
            println!(
                "Runway is now {} ({})",
                runway::format_runway(planner.runway_months()),
                planner.runway_alert()
            );
            Ok(())
        }

        ParamsCommand::Reset => {
            planner.restore_default_parameters();
            println!("Parameters reset to defaults.");
            Ok(())
        }
    }
}

fn show_projection(planner: &mut Planner) -> Result<()> {
    let results = planner.calculate_scenario();
    println!("{}", tables::projection(results));

    match scenario::depletion_month(results) {
        Some(month) => println!("\nCash runs out in month {}.", month),
        None => println!(
            "\nCash stays positive for all {} months.",
            results.len().saturating_sub(1)
        ),
    }
    Ok(())
}

fn show_runway(planner: &Planner) -> Result<()> {
    let months = planner.runway_months();
    let health = planner.health();
    let today = Local::now().date_naive();

    print_session_banner(planner);
    println!("Runway:          {}", runway::format_runway(months));
    println!("Alert:           {}", planner.runway_alert());
    println!("Outlook:         {}", RunwayOutlook::from_runway(months));
    println!(
        "Net burn:        ${:.2}/month",
        runway::net_burn(planner.parameters())
    );
    if let Some(date) = runway::cash_out_date(months, today) {
        println!("Cash-out date:   {}", date.format("%Y-%m-%d"));
    }
    println!("Health score:    {}/100 ({})", health.score, health.status);

    println!("\n{}", tables::milestones(&runway::milestones(months)));
    println!(
        "\n{}",
        tables::breakdown(&planner.expense_breakdown(), planner.total_expenses())
    );
    Ok(())
}

/// Resolve a full record id from an id or unique prefix
fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, given: &str, what: &str) -> Result<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(given)).collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("No {} with id '{}'", what, given),
        _ => bail!("Id '{}' matches {} {}s; use more characters", given, matches.len(), what),
    }
}

/// Handle revenue stream subcommands
async fn handle_stream_command(action: StreamCommand, planner: &mut Planner) -> Result<()> {
    match action {
        StreamCommand::List => {
            let streams = planner.streams();
            if streams.is_empty() {
                println!("No revenue streams.");
                println!("\nUse 'runway-planner stream add' to add one");
                return Ok(());
            }

            println!("{}", tables::streams(streams));
            let summary = planner.revenue_summary();
            println!(
                "\nTotal: ${:.2}/month from {} customers, weighted growth {:.1}%, ${:.2} per customer",
                summary.total_revenue,
                summary.total_customers,
                summary.average_growth_rate,
                summary.average_revenue_per_customer
            );

            println!("\nTargets:");
            for t in revenue::revenue_targets(summary.total_revenue) {
                println!(
                    "  {:<13} ${:>12.2} / ${:>12.2} {}",
                    t.period,
                    t.actual,
                    t.target,
                    if t.achieved { "✓" } else { "" }
                );
            }
            Ok(())
        }

        StreamCommand::Add {
            name,
            kind,
            monthly_revenue,
            customers,
            average_value,
            growth_rate,
            color,
        } => {
            let average_value = average_value.unwrap_or(if customers > 0 {
                monthly_revenue / f64::from(customers)
            } else {
                0.0
            });
            let stream = planner
                .add_stream(NewRevenueStream {
                    name,
                    kind,
                    monthly_revenue,
                    customers,
                    average_value,
                    growth_rate,
                    color,
                })
                .await;

            println!(
                "Added stream {}: {} - ${:.2}/month",
                stream.id, stream.fields.name, stream.fields.monthly_revenue
            );
            println!(
                "Monthly revenue parameter is now ${:.2}",
                planner.parameters().monthly_revenue
            );
            Ok(())
        }

        StreamCommand::Update {
            id,
            name,
            kind,
            monthly_revenue,
            customers,
            average_value,
            growth_rate,
        } => {
            let id = resolve_id(planner.streams().iter().map(|s| s.id.as_str()), &id, "stream")?;
            let update = RevenueStreamUpdate {
                name,
                kind,
                monthly_revenue,
                customers,
                average_value,
                growth_rate,
                color: None,
            };
            if update == RevenueStreamUpdate::default() {
                bail!("Nothing to update. Pass at least one field flag (see --help).");
            }

            planner
                .update_stream(&id, update)
                .await
                .with_context(|| format!("Failed to update stream {}", id))?;
            println!("Updated stream {}", id);
            Ok(())
        }

        StreamCommand::Delete { id } => {
            let id = resolve_id(planner.streams().iter().map(|s| s.id.as_str()), &id, "stream")?;
            planner
                .delete_stream(&id)
                .await
                .with_context(|| format!("Failed to delete stream {}", id))?;
            println!("Deleted stream {}", id);
            Ok(())
        }
    }
}

/// Handle team subcommands
async fn handle_team_command(action: TeamCommand, planner: &mut Planner) -> Result<()> {
    match action {
        TeamCommand::List => {
            let members = planner.team();
            if members.is_empty() {
                println!("No team members.");
                println!("\nUse 'runway-planner team add' to add one");
                return Ok(());
            }

            println!("{}", tables::members(members));
            println!("\n{}", tables::departments(&team::department_stats(members)));

            let summary = planner.team_summary();
            println!(
                "\n{} active, ${:.2}/month salaries, ${:.2} average, {:.2}% equity",
                summary.active_members,
                summary.total_salary_cost,
                summary.average_salary,
                summary.total_equity
            );
            Ok(())
        }

        TeamCommand::Add {
            name,
            role,
            department,
            salary,
            start_date,
            equity,
        } => {
            let member = planner
                .add_member(NewTeamMember {
                    name,
                    role,
                    department,
                    salary,
                    start_date: start_date.unwrap_or_else(|| Local::now().date_naive()),
                    equity,
                    status: MemberStatus::Active,
                })
                .await;

            println!(
                "Added {} ({}) as {}",
                member.fields.name, member.id, member.fields.role
            );
            print_team_parameters(planner);
            Ok(())
        }

        TeamCommand::Status { id, status } => {
            let id = resolve_id(planner.team().iter().map(|m| m.id.as_str()), &id, "member")?;
            planner
                .set_member_status(&id, status)
                .await
                .with_context(|| format!("Failed to update member {}", id))?;
            println!("Member {} is now {}", id, status);
            print_team_parameters(planner);
            Ok(())
        }

        TeamCommand::Delete { id } => {
            let id = resolve_id(planner.team().iter().map(|m| m.id.as_str()), &id, "member")?;
            planner
                .delete_member(&id)
                .await
                .with_context(|| format!("Failed to delete member {}", id))?;
            println!("Removed member {}", id);
            print_team_parameters(planner);
            Ok(())
        }
    }
}

fn print_team_parameters(planner: &Planner) {
    let params = planner.parameters();
    println!(
        "Team size is now {}, average salary ${:.2}",
        params.team_size, params.average_salary
    );
}

/// Generate CSV reports and print the console summary
fn run_report(planner: &mut Planner, output_dir: &std::path::Path, config: &Config) -> Result<()> {
    let today = Local::now().date_naive();
    let input = planner.prepare_report();

    let paths = CsvReport { output_dir, today }.render(&input)?;
    reports::print_summary(&input, &config.report_title, today);

    println!("Reports written:");
    for path in paths {
        println!("  {}", path.display());
    }
    Ok(())
}

async fn show_usage(planner: &Planner, sqlite: Option<&SqliteStore>) -> Result<()> {
    let usage = planner.usage();
    print_session_banner(planner);
    println!("Sessions:           {}", usage.sessions_count);
    println!("Scenarios run:      {}", usage.scenarios_run);
    println!("Reports generated:  {}", usage.reports_generated);
    println!(
        "Last active:        {}",
        usage.last_active.format("%Y-%m-%d %H:%M UTC")
    );

    if let (Some(sqlite), Some(user)) = (sqlite, planner.user_id()) {
        println!("\nStored: {}", sqlite.stats(user).await?);
    }
    Ok(())
}

fn print_session_banner(planner: &Planner) {
    match (planner.mode(), planner.user_id()) {
        (Mode::Demo, _) => println!("[demo mode - changes are not saved]\n"),
        (Mode::Live, None) => println!("[no user - changes are not saved]\n"),
        (Mode::Live, Some(user)) if !planner.is_persistent() => {
            println!("[storage disabled for {} - changes are not saved]\n", user)
        }
        (Mode::Live, Some(_)) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_id_by_prefix() {
        let ids = ["abc123", "abd456", "xyz789"];

        assert_eq!(resolve_id(ids.into_iter(), "abc", "stream").unwrap(), "abc123");
        assert_eq!(resolve_id(ids.into_iter(), "xyz789", "stream").unwrap(), "xyz789");
        assert!(resolve_id(ids.into_iter(), "ab", "stream").is_err());
        assert!(resolve_id(ids.into_iter(), "nope", "stream").is_err());
    }

    #[test]
    fn test_cli_parses_stream_add() {
        let args = Args::try_parse_from([
            "runway-planner",
            "--user",
            "founder",
            "stream",
            "add",
            "--name",
            "Licensing",
            "--type",
            "commission",
            "--monthly-revenue",
            "2500",
            "--growth-rate",
            "-5",
        ])
        .unwrap();

        assert_eq!(args.user.as_deref(), Some("founder"));
        match args.command {
            Some(Command::Stream {
                action: StreamCommand::Add { kind, growth_rate, .. },
            }) => {
                assert_eq!(kind, RevenueStreamKind::Commission);
                assert_eq!(growth_rate, -5.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_stream_type() {
        let result = Args::try_parse_from([
            "runway-planner",
            "stream",
            "add",
            "--name",
            "X",
            "--type",
            "barter",
            "--monthly-revenue",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_team_status() {
        let args =
            Args::try_parse_from(["runway-planner", "team", "status", "abc", "inactive"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Team {
                action: TeamCommand::Status {
                    status: MemberStatus::Inactive,
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_params_set_requires_a_flag() {
        let mut planner = Planner::standalone();
        let empty = ParamsCommand::Set {
            current_cash: None,
            monthly_revenue: None,
            monthly_expenses: None,
            growth_rate: None,
            team_size: None,
            average_salary: None,
            marketing_budget: None,
            operational_expenses: None,
        };
        assert!(handle_params_command(empty, &mut planner).is_err());
    }

    #[tokio::test]
    async fn test_sqlite_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            user_id: Some("founder".into()),
            demo_mode: false,
            report_title: "Test".into(),
            database: Some(dir.path().join("planner.sqlite")),
        };

        let sqlite = open_store(&config).await.unwrap().unwrap();
        let mut planner = Planner::new(sqlite.clone(), config.user_id.clone());
        planner.load().await;
        handle_stream_command(StreamCommand::Delete { id: planner.streams()[0].id.clone() }, &mut planner)
            .await
            .unwrap();
        planner.flush().await;

        let mut reloaded = Planner::new(sqlite.clone(), config.user_id.clone());
        reloaded.load().await;
        reloaded.flush().await;

        assert_eq!(reloaded.streams().len(), 2);
        // 12000 + 8500 after removing the 35000 stream
        assert_eq!(reloaded.parameters().monthly_revenue, 20500.0);
        assert_eq!(reloaded.usage().sessions_count, 2);
    }

    #[tokio::test]
    async fn test_demo_config_skips_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            user_id: Some("founder".into()),
            demo_mode: true,
            report_title: "Test".into(),
            database: Some(dir.path().join("planner.sqlite")),
        };

        assert!(open_store(&config).await.unwrap().is_none());
        assert!(!dir.path().join("planner.sqlite").exists());
    }
}

use crate::commands;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use recruit_recovery::error::AppError;
use recruit_recovery::store::parse_timestamp;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "recruit-recovery",
    about = "Recover candidate assignments lost in a CRM failure and report the outcome",
    version
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct GlobalArgs {
    /// Override the configured SQLite database path
    #[arg(long, global = true)]
    pub(crate) database: Option<PathBuf>,
    /// Override the directory CSV reports are written to
    #[arg(long, global = true)]
    pub(crate) report_dir: Option<PathBuf>,
    /// Override the audit log file
    #[arg(long, global = true)]
    pub(crate) audit_log: Option<PathBuf>,
    /// Override the per-phase distribution limit (a positive integer)
    #[arg(long, global = true, value_parser = parse_batch_limit)]
    pub(crate) batch_limit: Option<usize>,
    /// Timestamp stamped on new assignments (YYYY-MM-DD HH:MM:SS). Defaults to now.
    #[arg(long, global = true, value_parser = parse_run_at)]
    pub(crate) run_at: Option<NaiveDateTime>,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub(crate) json: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Run statistics, distribution, reports, and the top developer lookup (default command)
    Run(DistributeArgs),
    /// Count candidates tested and assigned to a recruiter before the failure
    Stats,
    /// Refresh attached counts and distribute post-incident candidates
    Distribute(DistributeArgs),
    /// Write the recruiter and developer CSV reports
    Report,
    /// Show the developer with the most post-incident candidates
    TopDeveloper,
    /// Create the CRM tables in the configured database
    InitDb,
    /// Load a CSV export of the CRM tables into the configured database
    Import(ImportArgs),
}

#[derive(Args, Debug, Default, Clone, Copy)]
pub(crate) struct DistributeArgs {
    /// Compute the distribution and roll it back instead of committing
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Employees CSV (id,fio,role,efficiency)
    #[arg(long)]
    pub(crate) employees: PathBuf,
    /// Candidates CSV (id,city_id,date_test)
    #[arg(long)]
    pub(crate) candidates: PathBuf,
    /// Assignments CSV (candidate_id,city_id,employee_id,created_at)
    #[arg(long)]
    pub(crate) assignments: Option<PathBuf>,
}

pub(crate) fn parse_run_at(raw: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD HH:MM:SS"))
}

pub(crate) fn parse_batch_limit(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(format!("batch limit must be a positive integer, got '{raw}'")),
    }
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(DistributeArgs::default()));

    match command {
        Command::Run(args) => commands::run_all(&cli.global, args),
        Command::Stats => commands::stats(&cli.global),
        Command::Distribute(args) => commands::distribute(&cli.global, args),
        Command::Report => commands::report(&cli.global),
        Command::TopDeveloper => commands::top_developer(&cli.global),
        Command::InitDb => commands::init_db(&cli.global),
        Command::Import(args) => commands::import(&cli.global, args),
    }
}

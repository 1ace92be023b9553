pub mod commands;

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use assurini_core::config::{AppConfig, LoadOptions};
use assurini_core::{BudgetTier, TripParameters, TripPurpose};

#[derive(Debug, Parser)]
#[command(
    name = "assurini",
    about = "Assurini travel insurance CLI",
    long_about = "Price trips, generate plan recommendations, and manage issued contracts.",
    after_help = "Examples:\n  assurini premium --destination France --start 2025-10-01 --end 2025-10-16 --age 30\n  assurini quote --destination Canada --start 2025-10-01 --end 2025-10-06 --age 10\n  assurini modify --policy ASNI-XXXXXXXXXX --email amel@example.dz --destination Canada --start 2025-10-01 --end 2025-10-21 --confirm"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a trip deterministically and print the full breakdown")]
    Premium(PremiumArgs),
    #[command(about = "Generate a plan recommendation and optionally issue a contract")]
    Quote(QuoteArgs),
    #[command(about = "Price a change to an issued contract and optionally confirm it")]
    Modify(ModifyArgs),
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BudgetArg {
    Essential,
    Comfort,
    Premium,
}

impl From<BudgetArg> for BudgetTier {
    fn from(value: BudgetArg) -> Self {
        match value {
            BudgetArg::Essential => Self::Essential,
            BudgetArg::Comfort => Self::Comfort,
            BudgetArg::Premium => Self::Premium,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PurposeArg {
    Leisure,
    Business,
    Study,
    FamilyVisit,
    Other,
}

impl From<PurposeArg> for TripPurpose {
    fn from(value: PurposeArg) -> Self {
        match value {
            PurposeArg::Leisure => Self::Leisure,
            PurposeArg::Business => Self::Business,
            PurposeArg::Study => Self::Study,
            PurposeArg::FamilyVisit => Self::FamilyVisit,
            PurposeArg::Other => Self::Other,
        }
    }
}

#[derive(Debug, Args)]
pub struct TripArgs {
    #[arg(long)]
    pub destination: String,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: NaiveDate,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: NaiveDate,
    #[arg(long, default_value_t = 1)]
    pub travelers: u32,
    #[arg(long)]
    pub age: u32,
    #[arg(long, default_value = "None")]
    pub conditions: String,
    #[arg(long, value_enum, default_value_t = PurposeArg::Leisure)]
    pub purpose: PurposeArg,
    #[arg(long, value_enum, default_value_t = BudgetArg::Essential)]
    pub budget: BudgetArg,
}

impl TripArgs {
    pub fn to_trip(&self) -> TripParameters {
        TripParameters {
            destination: self.destination.clone(),
            start_date: self.start,
            end_date: self.end,
            traveler_count: self.travelers,
            traveler_age: self.age,
            pre_existing_conditions: self.conditions.clone(),
            trip_purpose: self.purpose.into(),
            budget: self.budget.into(),
        }
    }
}

#[derive(Debug, Args)]
pub struct PremiumArgs {
    #[command(flatten)]
    pub trip: TripArgs,
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub trip: TripArgs,
    #[arg(long, help = "Persist the quoted plan as an issued contract")]
    pub issue: bool,
    #[arg(long, required_if_eq("issue", "true"))]
    pub email: Option<String>,
    #[arg(long, required_if_eq("issue", "true"))]
    pub full_name: Option<String>,
    #[arg(long)]
    pub passport: Option<String>,
}

#[derive(Debug, Args)]
pub struct ModifyArgs {
    #[arg(long)]
    pub policy: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub destination: String,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: NaiveDate,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: NaiveDate,
    #[arg(long, help = "Apply the modification instead of only pricing it")]
    pub confirm: bool,
}

fn init_logging() {
    use assurini_core::config::LogFormat::*;
    use tracing::Level;

    let Ok(config) = AppConfig::load(LoadOptions::default()) else {
        return;
    };
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Premium(args) => commands::premium::run(&args),
        Command::Quote(args) => commands::quote::run(args),
        Command::Modify(args) => commands::modify::run(args),
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}

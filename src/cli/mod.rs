//! Command-line interface.
//!
//! Without a subcommand the binary starts the terminal UI. Each subcommand
//! runs one operation against the same services the screens use and exits.

mod commands;
mod common;
mod completions;

pub use common::*;

use crate::api::{BookingFilter, TaskFilter};
use crate::booking::Tier;
use crate::catalog::CategoryKey;
use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indoc::indoc;

const AFTER_HELP: &str = indoc! {"
    Run without a command to open the terminal UI.

    Configuration:
      ~/.config/servicebay/config.toml (override the directory with SERVICEBAY_CONFIG_DIR)
      SERVICEBAY_BACKEND_URL, SUPABASE_URL and SUPABASE_ANON_KEY may also be set in .env

    Examples:
      servicebay login sam@example.com
      servicebay shops tyre-change --tier premium
      servicebay book oil-change --shop o2 --date 2026-11-02 --time 10:30 \\
          --make Maruti --model Swift --registration TS09AB1234
      servicebay tasks --status in_progress
"};

/// Book vehicle-service appointments from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "servicebay",
    version,
    about,
    after_help = AFTER_HELP,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Detect the current location and print its address
    Locate,
    /// List service categories
    Services {
        /// Case-insensitive substring of the category name
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List nearby shops for a category with prices for a tier
    Shops {
        /// tyre-change, wheel-alignment, wheel-balancing, oil-change or battery-check
        category: CategoryKey,
        #[arg(short, long, default_value = "standard")]
        tier: Tier,
    },
    /// Book a shop
    Book {
        category: CategoryKey,
        /// Shop id as shown by `servicebay shops`
        #[arg(long)]
        shop: String,
        #[arg(long, default_value = "standard")]
        tier: Tier,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        registration: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List your bookings
    Bookings {
        /// ALL or a category
        #[arg(short, long, default_value = "all")]
        filter: BookingFilter,
    },
    /// List tasks by status
    Tasks {
        /// ALL, PENDING, IN_PROGRESS or COMPLETED
        #[arg(short, long, default_value = "all")]
        status: TaskFilter,
    },
    /// Create a task
    TaskAdd {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "PENDING")]
        status: String,
    },
    /// Print the configuration file location
    Config,
    /// Shows logs location and how to view them
    Logs,
    /// Generate shell completions
    Completions {
        /// Detected from $SHELL when omitted
        shell: Option<Shell>,
    },
}

impl Cli {
    /// Run the subcommand. `Ok(false)` means no subcommand was given and the
    /// caller should start the UI.
    pub fn execute(self) -> Result<bool> {
        let Some(command) = self.command else {
            return Ok(false);
        };
        match command {
            Commands::Completions { shell } => completions::generate(shell)?,
            Commands::Config => commands::config(),
            Commands::Logs => commands::logs(),
            Commands::Services { search } => commands::services(search.as_deref()),
            Commands::Shops { category, tier } => commands::shops(&CliContext::load()?, category, tier)?,
            Commands::Login { email, password } => commands::login(&CliContext::load()?, &email, password)?,
            Commands::Signup { email, password } => commands::signup(&CliContext::load()?, &email, password)?,
            Commands::Logout => commands::logout(&CliContext::load()?)?,
            Commands::Whoami => commands::whoami(&CliContext::load()?)?,
            Commands::Locate => commands::locate(&CliContext::load()?)?,
            Commands::Book {
                category,
                shop,
                tier,
                date,
                time,
                make,
                model,
                registration,
                notes,
            } => {
                let visit = commands::VehicleVisit {
                    date,
                    time,
                    make,
                    model,
                    registration,
                    notes: notes.unwrap_or_default(),
                };
                commands::book(&CliContext::load()?, category, &shop, tier, visit)?;
            }
            Commands::Bookings { filter } => commands::bookings(&CliContext::load()?, filter)?,
            Commands::Tasks { status } => commands::tasks(&CliContext::load()?, status)?,
            Commands::TaskAdd {
                name,
                description,
                status,
            } => commands::task_add(&CliContext::load()?, name, description, status)?,
        }
        Ok(true)
    }
}

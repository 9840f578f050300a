//! Argument parsing surface for the account assignment CLI.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Set the profile (e.g., "dev", "release")
    #[arg(long, default_value = "dev")]
    pub profile: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Mirrors [`terra_orchestrator::Scope`] as a clap-friendly enum.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ScopeArg {
    Customers,
    Prospects,
    All,
}

impl From<ScopeArg> for terra_orchestrator::Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Customers => terra_orchestrator::Scope::Customers,
            ScopeArg::Prospects => terra_orchestrator::Scope::Prospects,
            ScopeArg::All => terra_orchestrator::Scope::All,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load raw accounts/opportunities/reps JSON into a fixture, aggregating
    /// accounts up to their parent (§4.1) and writing a default configuration
    /// if the fixture doesn't already carry one.
    Import {
        /// Fixture file to create or append to
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long, default_value = "default")]
        build_id: String,
        /// Raw accounts, as a JSON array of `Account`
        #[arg(long)]
        accounts: PathBuf,
        /// Raw opportunities, as a JSON array of `Opportunity`
        #[arg(long)]
        opportunities: PathBuf,
        /// Sales reps, as a JSON array of `SalesRep`
        #[arg(long)]
        reps: PathBuf,
        /// Build configuration, as TOML; compiled defaults are used if absent
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run a `generate` pass over a fixture and write the resulting report
    Generate {
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long, default_value = "default")]
        build_id: String,
        #[arg(long, value_enum, default_value = "all")]
        scope: ScopeArg,
        /// Where to write the JSON-encoded generate report
        #[arg(long)]
        out: PathBuf,
    },
    /// Apply a previously generated report's proposals to a fixture
    Execute {
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long, default_value = "default")]
        build_id: String,
        /// A generate report written by `terra-cli generate --out`
        #[arg(long)]
        report: PathBuf,
        /// Write updates even if a rep would be pushed over its ARR band
        #[arg(long)]
        bypass_imbalance_check: bool,
    },
    /// Toggle the backfill-on-leave workflow (§4.7) for a departing rep
    Backfill {
        #[command(subcommand)]
        command: BackfillCommands,
    },
    /// Inspect the local environment and report common setup issues
    Doctor {},
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackfillCommands {
    /// Route a leaving rep's book to a synthetic backfill-target rep
    Enable {
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long, default_value = "default")]
        build_id: String,
        #[arg(long)]
        rep: String,
        #[arg(long)]
        actor: String,
    },
    /// Retire a rep's backfill-target status once a permanent owner lands
    Disable {
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long, default_value = "default")]
        build_id: String,
        #[arg(long)]
        rep: String,
        #[arg(long)]
        actor: String,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

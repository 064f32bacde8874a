use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use note_generation::Domain;
use uuid::Uuid;

/// Scribe Engine operator CLI
#[derive(Parser, Debug)]
#[command(name = "scribe", version)]
#[command(about = "Generate clinical notes behind the entitlement gate")]
pub struct Cli {
    /// YAML seed for the in-memory entitlement store
    #[arg(long, env = "SCRIBE_SEED_FILE", default_value = "scribe-seed.yaml", global = true)]
    pub seed: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reserve usage, generate a note, release the reservation on fallback
    Generate(GenerateArgs),

    /// Print the entitlement decision for a user
    Check {
        #[arg(long)]
        user: Uuid,
    },

    /// Print this month's usage for a user
    Usage {
        #[arg(long)]
        user: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub user: Uuid,

    /// `medical` (SOAP) or `dental`
    #[arg(long, default_value = "medical")]
    pub domain: Domain,

    /// Transcript text; read from `--file` or stdin when omitted
    #[arg(long, conflicts_with = "file")]
    pub transcript: Option<String>,

    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Include failed provider attempts in the output
    #[arg(long)]
    pub report: bool,
}

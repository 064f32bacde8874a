use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use entitlement_service::EntitlementGate;
use logger_redacted::{init_tracing, LoggerConfig};
use note_generation::{NoteGenerationConfig, NoteGenerator};
use scribe_cli::cli::{Cli, Command, GenerateArgs};
use scribe_cli::commands::{self, GenerateOutcome};
use scribe_cli::seed;

/// Exit status for a request refused by the entitlement gate
const EXIT_DENIED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&LoggerConfig::from_env().verbose(cli.verbose))?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting scribe");

    let repository = seed::load_repository(&cli.seed).await?;
    let gate = EntitlementGate::new(Arc::new(repository));

    match cli.command {
        Command::Generate(args) => {
            let transcript = read_transcript(&args).await?;
            let config = NoteGenerationConfig::from_env()
                .context("Invalid note generation configuration")?;
            let generator = NoteGenerator::new(&config)?;

            match commands::generate(&gate, &generator, args.user, args.domain, &transcript).await? {
                GenerateOutcome::Denied(decision) => {
                    print_json(&decision)?;
                    return Ok(ExitCode::from(EXIT_DENIED));
                }
                GenerateOutcome::Generated { report, .. } if args.report => print_json(&report)?,
                GenerateOutcome::Generated { report, .. } => print_json(&report.note)?,
            }
        }
        Command::Check { user } => {
            let decision = commands::check(&gate, user).await?;
            print_json(&decision)?;
            if !decision.allowed {
                return Ok(ExitCode::from(EXIT_DENIED));
            }
        }
        Command::Usage { user } => print_json(&commands::usage(&gate, user).await?)?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn read_transcript(args: &GenerateArgs) -> Result<String> {
    if let Some(text) = &args.transcript {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read transcript file {}", path.display()));
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read transcript from stdin")?;
    Ok(text)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

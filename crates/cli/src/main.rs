//! KycShield CLI - Main entry point

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use kycshield_cli::{commands, EnrichOptions};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "kycshield")]
#[command(about = "KycShield - KYC fraud & risk decision engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a KYC submission (JSON)
    Assess {
        /// Submission file
        file: PathBuf,
        /// Risk configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Fill missing collaborator signals with offline doubles
        #[arg(long)]
        enrich: bool,
        /// Face match confidence used by --enrich
        #[arg(long, requires = "enrich")]
        face_confidence: Option<f64>,
    },

    /// Issue a new liveness session
    LivenessSession {
        /// Liveness configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed for reproducible challenge selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Replay evidence against a session and evaluate it
    LivenessEvaluate {
        /// Session file (output of `liveness-session`)
        session: PathBuf,
        /// Evidence file
        evidence: PathBuf,
        /// Liveness configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a loan application (JSON)
    Loan {
        /// Application file
        file: PathBuf,
        /// Lending configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Credit bureau score for applicants without one
        #[arg(long)]
        bureau_score: Option<u16>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            file,
            config,
            enrich,
            face_confidence,
        } => {
            let enrich = enrich.then_some(EnrichOptions { face_confidence });
            let assessment = commands::assess(&file, config.as_deref(), enrich).await?;
            print_json(&assessment)?;
        }

        Commands::LivenessSession { config, seed } => {
            let session = commands::liveness_session(config.as_deref(), seed, Utc::now())?;
            print_json(&session)?;
        }

        Commands::LivenessEvaluate {
            session,
            evidence,
            config,
        } => {
            let report = commands::liveness_evaluate(&session, &evidence, config.as_deref())?;
            print_json(&report)?;
        }

        Commands::Loan {
            file,
            config,
            bureau_score,
        } => {
            let assessment = commands::loan(&file, config.as_deref(), bureau_score).await?;
            print_json(&assessment)?;
        }
    }

    tracing::debug!("command finished");
    Ok(())
}

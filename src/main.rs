mod archive;
mod error;
mod mailer;
mod notify;
mod parser;
mod pipeline;
mod report;
mod settings;
mod utils;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::archive::SignatureVerifier;
use crate::mailer::{DryRunTransport, SmtpTransport};
use crate::notify::{CommandRenderer, NotificationPlanner};
use crate::pipeline::Pipeline;
use crate::settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "report_mailer",
    version,
    about = "Read .signed.zip grader reports, edit a response and e-mail it back"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// Directory searched recursively for *.signed.zip files
    path: PathBuf,
    /// Settings file (default: ./report_mailer.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Echo extracted values and @author matches
    #[arg(short, long)]
    verbose: bool,
    /// How student listings are recognised (overrides `listing_matcher`)
    #[arg(long, value_parser = ["state-machine", "combined-class"])]
    matcher: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, edit and mail every report under PATH
    Run {
        #[command(flatten)]
        common: Common,
        /// SMTP login / sender address
        #[arg(short, long)]
        email: Option<String>,
        /// SMTP password
        #[arg(short, long)]
        password: Option<String>,
        /// Re-render and resend even if already sent, keeping the comment
        #[arg(short, long)]
        resend: bool,
        /// Build messages but do not send them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the extracted values of every report under PATH as JSON
    Inspect {
        #[command(flatten)]
        common: Common,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            common,
            email,
            password,
            resend,
            dry_run,
        } => {
            init_tracing(common.verbose);
            let settings = load_settings(
                common.config.as_deref(),
                Overrides {
                    sender_address: email,
                    password,
                    listing_matcher: common.matcher,
                },
            )?;
            let archives = discover(&common.path)?;
            if archives.is_empty() {
                return Ok(());
            }

            let planner = NotificationPlanner::new(
                CommandRenderer::new(settings.render_command.clone()),
                settings.colors(),
                settings.code_language.clone(),
            );
            let verifier = SignatureVerifier::new(settings.verify_command.clone());
            let summary = if dry_run {
                Pipeline::new(
                    planner,
                    DryRunTransport::new(settings.mailer()),
                    verifier,
                    settings.listing_matcher,
                    resend,
                    common.verbose,
                )
                .run(&archives)
            } else {
                let transport =
                    SmtpTransport::new(settings.mailer()).context("setting up SMTP transport")?;
                Pipeline::new(
                    planner,
                    transport,
                    verifier,
                    settings.listing_matcher,
                    resend,
                    common.verbose,
                )
                .run(&archives)
            };
            summary.print();
        }
        Commands::Inspect { common } => {
            init_tracing(common.verbose);
            let settings = load_settings(
                common.config.as_deref(),
                Overrides {
                    listing_matcher: common.matcher,
                    ..Overrides::default()
                },
            )?;
            let archives = discover(&common.path)?;
            let verifier = SignatureVerifier::new(settings.verify_command.clone());
            let records = pipeline::inspect(
                &archives,
                &verifier,
                settings.listing_matcher,
                common.verbose,
            );
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

fn load_settings(file: Option<&Path>, overrides: Overrides) -> anyhow::Result<Settings> {
    let settings = Settings::load(file, overrides).context("loading settings")?;
    info!(
        sender = %settings.sender_address,
        smtp = %settings.smtp_host,
        render = ?settings.render_command,
        "settings loaded"
    );
    Ok(settings)
}

fn discover(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let archives = archive::discover(root)
        .with_context(|| format!("searching {} for archives", root.display()))?;
    if archives.is_empty() {
        println!("No *.signed.zip files under {}.", root.display());
    } else {
        info!("Found {} archives under {}", archives.len(), root.display());
    }
    Ok(archives)
}

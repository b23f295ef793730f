//! Fluency CLI - learner progression tracker.

mod config;
mod render;

use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use fluency_core::UserId;
use fluency_progress::{ProgressError, ProgressUpdate, ProgressionService};
use fluency_storage::{CachedStorage, JsonStorage, Storage};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "fluency")]
#[command(about = "Learner progression tracker", long_about = None)]
struct Cli {
    /// Directory holding stored stats
    #[arg(long, global = true, env = "FLUENCY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to <data-dir>/config.json if present)
    #[arg(long, global = true, env = "FLUENCY_CONFIG")]
    config: Option<PathBuf>,

    /// Learner id
    #[arg(long, short, global = true, env = "FLUENCY_USER")]
    user: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show level, experience, streak and achievements
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add experience points
    AddXp {
        /// Amount to add
        amount: u64,
    },
    /// Record a learning activity
    Activity {
        /// Activity date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Unlock an achievement from the catalog
    Unlock {
        /// Achievement id
        achievement_id: String,
    },
    /// List the achievement catalog
    Achievements,
    /// List learners with stored stats
    Users,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let (app, data_dir) = AppConfig::resolve(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let curve = app.curve()?;
    debug!(data_dir = %data_dir.display(), base_xp = curve.base_xp(), growth = curve.growth(), "configuration");

    let storage = JsonStorage::new(&data_dir)
        .await
        .with_context(|| format!("opening data directory {}", data_dir.display()))?
        .with_curve(curve);
    let mut service = ProgressionService::new(CachedStorage::new(storage)).with_curve(curve);

    match cli.command {
        Commands::Users => {
            let users = service.storage().list_users().await?;
            println!("Learners ({})", users.len());
            for user in users {
                println!("  {}", user);
            }
        }
        Commands::Achievements => {
            let unlocked = match cli.user.as_deref() {
                Some(id) => Some(service.load(&UserId::new(id)?).await?),
                None => None,
            };
            println!("Achievements ({})", service.catalog().len());
            for achievement in service.catalog() {
                let mark = match &unlocked {
                    Some(stats) if stats.has_achievement(&achievement.id) => "[x]",
                    Some(_) => "[ ]",
                    None => "   ",
                };
                println!(
                    "  {} {:<14} {:<22} +{:<4} {}",
                    mark, achievement.id, achievement.title, achievement.xp_reward, achievement.description
                );
            }
        }
        Commands::Show { json } => {
            let user = require_user(cli.user.as_deref())?;
            let summary = match service.summary(&user).await {
                Ok(summary) => summary,
                Err(err @ ProgressError::Unavailable { .. }) => {
                    warn!(%user, error = %err, "showing in-memory defaults");
                    eprintln!("Progress storage unavailable; showing defaults.");
                    let fallback = err.fallback().cloned().unwrap_or_default();
                    service.summarize(&user, fallback)
                }
                Err(err) => return Err(err.into()),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render::summary(&summary));
            }
        }
        Commands::AddXp { amount } => {
            let user = require_user(cli.user.as_deref())?;
            let update = service.add_experience(&user, amount).await;
            report(update)?;
        }
        Commands::Activity { date } => {
            let user = require_user(cli.user.as_deref())?;
            let today = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let update = service.record_activity(&user, today).await;
            report(update)?;
        }
        Commands::Unlock { achievement_id } => {
            let user = require_user(cli.user.as_deref())?;
            let update = service.unlock_achievement(&user, &achievement_id).await;
            report(update)?;
        }
    }

    Ok(())
}

fn require_user(user: Option<&str>) -> Result<UserId> {
    match user {
        Some(id) => Ok(UserId::new(id)?),
        None => bail!("--user is required for this command"),
    }
}

fn report(update: fluency_progress::Result<ProgressUpdate>) -> Result<()> {
    match update {
        Ok(update) => {
            if update.events.is_empty() {
                println!("No change");
            }
            for event in &update.events {
                println!("{}", render::event(event));
            }
            println!(
                "Now level {} with {} XP, streak {} day(s)",
                update.stats.level, update.stats.experience_points, update.stats.current_streak_days
            );
            Ok(())
        }
        Err(err) => {
            if let Some(stats) = err.fallback() {
                eprintln!(
                    "Not saved. Unsaved state: level {} with {} XP, streak {} day(s)",
                    stats.level, stats.experience_points, stats.current_streak_days
                );
            }
            Err(err.into())
        }
    }
}

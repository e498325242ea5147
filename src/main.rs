use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourney_overlap::calculate::calculate_time_range_months;
use tourney_overlap::compare::HistoryComparer;
use tourney_overlap::config::AppConfig;
use tourney_overlap::extract::extract_tournaments;
use tourney_overlap::fetch::{decode_payload, FileHistorySource, HistorySource, HttpHistorySource};
use tourney_overlap::models::{CommonTournament, SharedHistory};

#[derive(Parser)]
#[command(name = "tourney-overlap")]
#[command(about = "Find the tournaments two sendou.ink players both entered")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./tourney-overlap.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tournaments you and another user both entered
    Compare {
        /// User to compare against
        them: String,

        /// Your username (defaults to [user].name from the config)
        #[arg(long)]
        me: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Read saved payloads ({dir}/{username}.json) instead of fetching
        #[arg(long)]
        payload_dir: Option<PathBuf>,
    },

    /// Show one user's extracted tournament history
    History {
        user: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Read saved payloads ({dir}/{username}.json) instead of fetching
        #[arg(long)]
        payload_dir: Option<PathBuf>,
    },

    /// Extract tournaments from a saved payload file
    Parse {
        file: PathBuf,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_source(config: &AppConfig, payload_dir: Option<PathBuf>) -> Result<Arc<dyn HistorySource>> {
    match payload_dir {
        Some(dir) => Ok(Arc::new(FileHistorySource::new(dir))),
        None => {
            let source = HttpHistorySource::new(config.source.fetcher_config())
                .context("Failed to build HTTP client")?;
            Ok(Arc::new(source))
        }
    }
}

fn placement(p: Option<u32>) -> String {
    p.map_or_else(|| "?".to_string(), |p| p.to_string())
}

fn format_match(m: &CommonTournament) -> String {
    let date = m.date.as_deref().map_or("----------", |d| &d[..10.min(d.len())]);

    let result = if m.were_teammates {
        let division = m
            .shared_division()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        format!("Teammates: #{}{}", placement(m.your_placement), division)
    } else {
        let of_teams = m
            .team_count
            .map(|n| format!(" of {}", n))
            .unwrap_or_default();
        format!(
            "You: #{}{} | Them: #{}",
            placement(m.your_placement),
            of_teams,
            placement(m.their_placement)
        )
    };

    format!("{}  {}  {}\n            {}", date, m.tournament_name, result, m.url)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(level, cli.json_logs);

    tracing::debug!("Starting tourney-overlap v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Compare {
            them,
            me,
            json,
            payload_dir,
        } => {
            let Some(me) = me.or_else(|| config.user.name.clone()) else {
                bail!("No username to compare from: pass --me or set [user].name in the config");
            };

            let source = build_source(&config, payload_dir)?;
            let comparer = HistoryComparer::new(source, config.source.base_url()?);

            let outcome = comparer.compare(&me, &them).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            match outcome {
                SharedHistory::Found(comparison) => {
                    println!("{}", comparison.headline());
                    for m in &comparison.matches {
                        println!("{}", format_match(m));
                    }
                }
                SharedHistory::NoneShared { .. } => {
                    println!("No shared tourneys found between you and {}", them);
                }
            }
        }
        Commands::History {
            user,
            json,
            payload_dir,
        } => {
            let source = build_source(&config, payload_dir)?;
            let comparer = HistoryComparer::new(source, config.source.base_url()?);

            let tournaments = comparer
                .load_tournaments(&user)
                .await
                .with_context(|| format!("Could not load {}'s tournament history", user))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&tournaments)?);
                return Ok(());
            }

            println!(
                "{}: {} tournaments over {} months",
                user,
                tournaments.len(),
                calculate_time_range_months(&tournaments)
            );
            for t in &tournaments {
                println!(
                    "{}  #{}  {}",
                    t.tournament_id,
                    placement(t.placement),
                    t.event_name.as_deref().unwrap_or("?")
                );
            }
        }
        Commands::Parse { file } => {
            let tournaments = parse_file(&file).await?;
            println!("{}", serde_json::to_string_pretty(&tournaments)?);
        }
    }

    Ok(())
}

async fn parse_file(path: &Path) -> Result<Vec<tourney_overlap::Tournament>> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let pool = decode_payload(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let tournaments = extract_tournaments(&pool);
    tracing::info!(
        "Parsed {} tournaments from {} values",
        tournaments.len(),
        pool.len()
    );
    Ok(tournaments)
}

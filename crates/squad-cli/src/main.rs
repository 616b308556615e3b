//! Console commander for the squad command simulation.
//!
//! Reads one commander order per line from stdin and plays one round per
//! order, printing the round narration and the squad's condition. An empty
//! line plays a round with no standing order; `quit`, `exit` or end of
//! input ends the session.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `squad-config.yaml` (or `SQUAD_CONFIG`)
//! 2. Initialize structured logging (tracing, to stderr)
//! 3. Restore an exported event log if `--resume` is given
//! 4. Pick the decision backend from the session mode
//! 5. Play rounds until input ends, then export the log if `--save` is given

mod backend;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use squad_core::{DecisionSource, RoundSummary, SessionConfig, SessionMode, TurnSequencer};
use squad_events::EventLog;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backend::Backend;

/// Longest order passed on to the squad, in characters.
const MAX_ORDER_CHARS: usize = 280;

#[derive(Debug, Parser)]
#[command(name = "squad", about = "Command a marine squad over the radio", version)]
struct Cli {
    /// Configuration file (defaults to `SQUAD_CONFIG`, then `squad-config.yaml`)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exported event log to continue from
    #[arg(long, env = "SQUAD_RESUME")]
    resume: Option<PathBuf>,

    /// Where to export the event log when the session ends
    #[arg(long, env = "SQUAD_SAVE")]
    save: Option<PathBuf>,

    /// Random decisions and fallbacks instead of production play
    #[arg(long)]
    mock: bool,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Play this many rounds without orders and exit (0 reads orders from stdin)
    #[arg(long, default_value_t = 0)]
    rounds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(SessionConfig::path_from_env);
    let found = config_path.exists();
    let mut config = if found {
        SessionConfig::from_file(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?
    } else {
        SessionConfig::default()
    };
    if cli.mock {
        config.session.mode = SessionMode::Mock;
    }
    if let Some(seed) = cli.seed {
        config.session.seed = seed;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if !found {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    let log = cli
        .resume
        .as_deref()
        .map(load_log)
        .transpose()?
        .unwrap_or_else(EventLog::new);
    let mut sequencer = TurnSequencer::with_log(log, &config);
    let mut backend = Backend::for_config(&config);
    info!(
        backend = backend.name(),
        seed = config.session.seed,
        decision_timeout_ms = config.session.decision_timeout().as_millis(),
        resumed_events = sequencer.log().len(),
        resumed_rounds = sequencer.round(),
        "Session ready"
    );

    if cli.rounds == 0 {
        command_loop(&mut sequencer, &mut backend).await?;
    } else {
        for _ in 0..cli.rounds {
            let summary = sequencer.run_round(&mut backend, None).await?;
            print_summary(&mut sequencer, &summary);
        }
    }

    if let Some(path) = &cli.save {
        save_log(sequencer.log(), path)?;
    }
    info!(rounds = sequencer.round(), events = sequencer.log().len(), "Session over");
    Ok(())
}

/// Play one round per line of stdin.
async fn command_loop<S: DecisionSource>(
    sequencer: &mut TurnSequencer,
    source: &mut S,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Round {}. Orders, commander?", sequencer.round().saturating_add(1));
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read orders from stdin")?
    {
        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            break;
        }
        let order = bounded_order(line);
        let summary = sequencer.run_round(source, order.as_deref()).await?;
        print_summary(sequencer, &summary);
        println!("Round {}. Orders, commander?", sequencer.round().saturating_add(1));
    }
    Ok(())
}

/// The order as passed to the squad: trimmed, bounded, `None` when blank.
fn bounded_order(line: &str) -> Option<String> {
    let line = line.trim();
    (!line.is_empty()).then(|| line.chars().take(MAX_ORDER_CHARS).collect())
}

fn print_summary(sequencer: &mut TurnSequencer, summary: &RoundSummary) {
    println!("== Round {} ==", summary.round);
    for line in summary.narration() {
        println!("  {line}");
    }
    for marine in &sequencer.snapshot().agents.marines {
        let status = if marine.is_alive() { "" } else { " (down)" };
        println!(
            "  [{}] {} | health {}/10 | stress {:.1}{status}",
            marine.id, marine.position, marine.health, marine.stress
        );
    }
}

fn load_log(path: &Path) -> Result<EventLog> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let log = EventLog::from_json(&json)
        .with_context(|| format!("failed to restore event log from {}", path.display()))?;
    info!(path = %path.display(), events = log.len(), "Event log restored");
    Ok(log)
}

fn save_log(log: &EventLog, path: &Path) -> Result<()> {
    let json = log.to_json().context("failed to export the event log")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), events = log.len(), "Event log saved");
    Ok(())
}

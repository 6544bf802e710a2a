//! Matchday Simulation Binary
//!
//! Spawns the players, goalies, and referee of one match day and reports
//! how the teams came together.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use matchday::sim::{SimConfig, Simulation};
use matchday::{MATCH_TEAMS, TEAM_GOALIES, TEAM_PLAYERS, VERSION};

const USAGE: &str = "usage: matchday-sim [--players N] [--goalies N] [--seed N] \
                     [--jitter MIN..MAX] [--match-ms N] [--journal PATH]";

fn main() -> ExitCode {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration errors exit before any shared state exists
    let config = match parse_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("matchday-sim: {}", e);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    info!("Matchday Sim v{}", VERSION);
    info!(
        "Teams: {} x ({} players + {} goalie)",
        MATCH_TEAMS, TEAM_PLAYERS, TEAM_GOALIES
    );

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run(config: SimConfig) -> anyhow::Result<()> {
    let report = Simulation::new(config)
        .run()
        .await
        .context("simulation did not complete")?;

    // Print final results
    info!("=== Run Results ===");
    info!("Run {} (seed {})", report.run_id, report.base_seed);
    for (team, members) in &report.teams {
        info!("Team {}: {} actors bound", team, members);
    }
    info!(
        "{} teams formed, {} actors late",
        report.teams.len(),
        report.late
    );

    Ok(())
}

/// Parse command-line flags into a run configuration.
fn parse_args(args: impl Iterator<Item = String>) -> Result<SimConfig, String> {
    let mut config = SimConfig::default();
    let mut args = args;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--players" => config.players = parse_count(&value_of(&mut args, &flag)?, &flag)?,
            "--goalies" => config.goalies = parse_count(&value_of(&mut args, &flag)?, &flag)?,
            "--seed" => config.seed = Some(parse_num(&value_of(&mut args, &flag)?, &flag)?),
            "--jitter" => config.jitter_ms = parse_jitter(&value_of(&mut args, &flag)?)?,
            "--match-ms" => {
                config.match_len =
                    Duration::from_millis(parse_num(&value_of(&mut args, &flag)?, &flag)?)
            }
            "--journal" => config.journal_path = Some(PathBuf::from(value_of(&mut args, &flag)?)),
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    Ok(config)
}

fn value_of(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("missing value for {}", flag))
}

fn parse_num(raw: &str, flag: &str) -> Result<u64, String> {
    raw.parse::<u64>()
        .map_err(|_| format!("{} expects a non-negative integer, got '{}'", flag, raw))
}

fn parse_count(raw: &str, flag: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| format!("{} expects a non-negative integer, got '{}'", flag, raw))
}

/// Parse jitter bounds of the form `MIN..MAX` (inclusive, milliseconds).
fn parse_jitter(raw: &str) -> Result<(u64, u64), String> {
    let (min, max) = raw
        .split_once("..")
        .ok_or_else(|| format!("--jitter expects MIN..MAX, got '{}'", raw))?;
    let min = parse_num(min, "--jitter")?;
    let max = parse_num(max, "--jitter")?;
    if min > max {
        return Err(format!("--jitter bounds are inverted: {}..{}", min, max));
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(list: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
        list.iter().map(|s| s.to_string())
    }

    #[test]
    fn test_defaults_with_no_args() {
        let config = parse_args(args(&[])).unwrap();
        let defaults = SimConfig::default();
        assert_eq!(config.players, defaults.players);
        assert_eq!(config.goalies, defaults.goalies);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_full_flag_set() {
        let config = parse_args(args(&[
            "--players", "12", "--goalies", "3", "--seed", "7", "--jitter", "1..9",
            "--match-ms", "100", "--journal", "/tmp/run.jsonl",
        ]))
        .unwrap();

        assert_eq!(config.players, 12);
        assert_eq!(config.goalies, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.jitter_ms, (1, 9));
        assert_eq!(config.match_len, Duration::from_millis(100));
        assert_eq!(config.journal_path, Some(PathBuf::from("/tmp/run.jsonl")));
    }

    #[test]
    fn test_malformed_flags_are_rejected() {
        assert!(parse_args(args(&["--players"])).is_err());
        assert!(parse_args(args(&["--players", "five"])).is_err());
        assert!(parse_args(args(&["--jitter", "10"])).is_err());
        assert!(parse_args(args(&["--jitter", "9..1"])).is_err());
        assert!(parse_args(args(&["--kickoff"])).is_err());
    }
}

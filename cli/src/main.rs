use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, Subcommand};
use engine::api::{self, Scenario};
use tracing::debug;

#[derive(Subcommand)]
enum Cmd {
    /// Resolve one action described by a scenario and print the report as JSON
    #[command(group(ArgGroup::new("input").required(true).args(["scenario", "builtin"])))]
    Resolve {
        /// Path to a scenario file (JSON, or YAML by extension)
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Id of a bundled scenario (see `list`)
        #[arg(long)]
        builtin: Option<String>,
        /// RNG seed; replaces any fixed rolls the scenario carries
        #[arg(long)]
        seed: Option<u64>,
        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
        /// Print only the battle log, one line per entry
        #[arg(long, default_value_t = false)]
        log: bool,
        /// Debug-level engine tracing on stderr
        #[arg(long, short, default_value_t = false)]
        verbose: bool,
    },
    /// List the bundled scenarios
    List,
    /// Dump a bundled database as JSON
    Database {
        /// Database id
        #[arg(long, default_value = "default")]
        id: String,
        /// Print JSON on a single line
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
}

#[derive(Parser)]
#[command(name = "battle-cli")]
#[command(about = "Battle action resolution harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn load(scenario: Option<PathBuf>, builtin: Option<String>) -> anyhow::Result<Scenario> {
    match (scenario, builtin) {
        (Some(path), _) => api::load_scenario(&path),
        (None, Some(id)) => api::builtin_scenario(&id),
        (None, None) => bail!("either --scenario or --builtin is required"),
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Resolve {
            scenario,
            builtin,
            seed,
            pretty,
            log,
            verbose,
        } => {
            engine::init_logging(verbose);
            let mut scenario = load(scenario, builtin)?;
            if let Some(seed) = seed {
                scenario.seed = seed;
                scenario.rolls = None;
            }
            debug!(name = %scenario.name, seed = scenario.seed, "scenario loaded");
            let report = api::run_scenario(&scenario)
                .with_context(|| format!("failed to resolve scenario '{}'", scenario.name))?;
            if log {
                for line in &report.log {
                    println!("{}", line);
                }
            } else {
                print_json(&report, pretty)?;
            }
        }
        Cmd::List => {
            for id in api::builtin_scenario_ids() {
                println!("{}", id);
            }
        }
        Cmd::Database { id, compact } => {
            let db = api::builtin_database(&id)?;
            print_json(&db, !compact)?;
        }
    }
    Ok(())
}

use std::sync::Arc;

/// Reset SIGPIPE to default behavior so piping (e.g. `driftwood state list | head`)
/// exits cleanly instead of panicking on broken pipe.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use driftwood::backend::registry::BackendRegistry;
use driftwood::engine::LifecycleEngine;
use driftwood::output::formatter;
use driftwood::state::models::{ConfigMap, ResourceStatus, StateFilter};
use driftwood::state::sqlite::SqliteStore;
use driftwood::state::store::StateStore;

/// driftwood - resource lifecycle and drift-reconciliation engine
#[derive(Parser)]
#[command(name = "driftwood", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Working directory for the state database
    #[arg(short, long, default_value = ".driftwood")]
    working_dir: String,

    /// Deadline for each backend call, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what apply would do for a resource
    Plan {
        /// Resource id
        #[arg(long)]
        id: String,

        /// Platform backend name (e.g. kubernetes, ecs, app.container)
        #[arg(long)]
        platform: String,

        /// Desired configuration as key=value pairs
        #[arg(short, long)]
        set: Vec<String>,

        /// Desired configuration from a YAML file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Provision a resource through its platform backend
    Apply {
        #[arg(long)]
        id: String,

        #[arg(long)]
        platform: String,

        #[arg(short, long)]
        set: Vec<String>,

        #[arg(short, long)]
        config: Option<String>,
    },

    /// Show stored and live status for a resource
    Status {
        #[arg(long)]
        id: String,

        #[arg(long)]
        platform: String,
    },

    /// Tear a resource down
    Destroy {
        #[arg(long)]
        id: String,

        #[arg(long)]
        platform: String,
    },

    /// Compare the stored config baseline against a supplied config
    Drift {
        #[arg(long)]
        id: String,

        /// Current configuration as key=value pairs
        #[arg(short, long)]
        set: Vec<String>,

        /// Current configuration from a YAML file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Inspect stored resource state
    State {
        #[command(subcommand)]
        command: StateCommands,
    },

    /// List registered platform backends
    Platforms,
}

#[derive(Subcommand)]
enum StateCommands {
    /// List all resources in state
    List {
        /// Filter like "status=active" or "provider=kubernetes"
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show details for a specific resource
    Show {
        /// Resource id
        id: String,
    },

    /// Remove a resource record from state without destroying it
    Rm {
        /// Resource id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let engine = open_engine(&cli).await?;

    match cli.command {
        Commands::Plan {
            ref id,
            ref platform,
            ref set,
            ref config,
        } => {
            let desired = load_config(config.as_deref(), set)?;
            let plan = engine.plan_resource(id, platform, desired).await?;
            formatter::print_plan(&plan);
        }

        Commands::Apply {
            ref id,
            ref platform,
            ref set,
            ref config,
        } => {
            let desired = load_config(config.as_deref(), set)?;
            let outcome = engine.apply_resource(id, platform, desired).await?;
            formatter::print_apply(&outcome);
        }

        Commands::Status {
            ref id,
            ref platform,
        } => {
            let report = engine.status_resource(id, platform).await?;
            formatter::print_status(&report);
        }

        Commands::Destroy {
            ref id,
            ref platform,
        } => {
            let outcome = engine.destroy_resource(id, platform).await?;
            formatter::print_destroy(&outcome);
        }

        Commands::Drift { ref id, ref set, ref config } => {
            let current = load_config(config.as_deref(), set)?;
            let report = engine.detect_drift(id, &current).await?;
            formatter::print_drift(&report);
        }

        Commands::State { ref command } => {
            cmd_state(&cli, command).await?;
        }

        Commands::Platforms => {
            println!();
            println!("{}", "Registered Platforms".bold().cyan());
            println!("{}", "─".repeat(40));
            for name in engine.registry().platforms() {
                println!("  {} {}", "→".blue(), name.bold());
            }
            println!();
        }
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn open_store(working_dir: &str) -> Result<SqliteStore> {
    let db_path = format!("{}/driftwood.db", working_dir);
    SqliteStore::open(&db_path)
}

async fn open_engine(cli: &Cli) -> Result<LifecycleEngine> {
    let store = open_store(&cli.working_dir)?;
    store.initialize().await?;

    let registry = Arc::new(BackendRegistry::with_defaults());
    let mut engine = LifecycleEngine::new(Arc::new(store), registry);
    if let Some(secs) = cli.timeout {
        engine = engine.with_timeout(std::time::Duration::from_secs(secs));
    }
    Ok(engine)
}

/// Build a config map from an optional YAML file overlaid with key=value
/// pairs. `--set` values parse as JSON scalars where possible, otherwise
/// as strings.
fn load_config(config_file: Option<&str>, set: &[String]) -> Result<ConfigMap> {
    let mut config = match config_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            serde_yaml::from_str::<ConfigMap>(&raw)
                .with_context(|| format!("Failed to parse config file {}", path))?
        }
        None => ConfigMap::new(),
    };

    for pair in set {
        let kv: Vec<&str> = pair.splitn(2, '=').collect();
        if kv.len() != 2 || kv[0].is_empty() {
            bail!("Invalid --set value '{}'. Expected key=value.", pair);
        }
        let value = serde_json::from_str::<serde_json::Value>(kv[1])
            .unwrap_or_else(|_| serde_json::Value::String(kv[1].to_string()));
        config.insert(kv[0].to_string(), value);
    }

    Ok(config)
}

fn parse_state_filter(raw: Option<&str>) -> Result<StateFilter> {
    let mut filter = StateFilter::default();
    let Some(raw) = raw else {
        return Ok(filter);
    };
    for part in raw.split(',') {
        let kv: Vec<&str> = part.splitn(2, '=').collect();
        if kv.len() != 2 {
            bail!("Invalid filter '{}'. Expected key=value.", part);
        }
        match kv[0].trim() {
            "status" => {
                let status = ResourceStatus::parse(kv[1].trim())
                    .with_context(|| format!("Unknown status '{}'", kv[1].trim()))?;
                filter.status = Some(status);
            }
            "provider" => filter.provider = Some(kv[1].trim().to_string()),
            other => bail!("Unknown filter key '{}'. Use status or provider.", other),
        }
    }
    Ok(filter)
}

async fn cmd_state(cli: &Cli, command: &StateCommands) -> Result<()> {
    let store = open_store(&cli.working_dir)?;
    store.initialize().await?;

    match command {
        StateCommands::List { filter } => {
            let filter = parse_state_filter(filter.as_deref())?;
            let states = store.list(&filter).await?;
            formatter::print_state_list(&states);
        }

        StateCommands::Show { id } => {
            let state = store
                .get_state(id)
                .await?
                .with_context(|| format!("Resource '{}' not found in state.", id))?;
            formatter::print_state_detail(&state);
        }

        StateCommands::Rm { id } => {
            if store.get_state(id).await?.is_none() {
                bail!("Resource '{}' not found in state.", id);
            }
            store.delete(id).await?;
            formatter::print_success(&format!(
                "Removed {} from state (live resource unchanged).",
                id
            ));
        }
    }

    Ok(())
}

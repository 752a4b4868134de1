#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

mod app;
mod watcher;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rl::AgentKind;
use tracing_subscriber::EnvFilter;

use crate::app::{Overrides, PolicyKind, RunOptions};

/// Run arena agents headless.
#[derive(Parser, Debug)]
#[command(name = "runtime_main", version, about)]
struct Cli {
    /// Agent to run; overrides the config file
    #[arg(long, value_enum)]
    agent: Option<AgentArg>,

    /// Where actions come from
    #[arg(long, value_enum, default_value_t = PolicyArg::Scripted)]
    policy: PolicyArg,

    /// Number of episodes to run
    #[arg(long, default_value_t = 3)]
    episodes: u32,

    /// Step limit per episode
    #[arg(long)]
    max_steps: Option<u32>,

    /// Fixed timestep in seconds
    #[arg(long)]
    dt: Option<f32>,

    #[arg(long)]
    seed: Option<u64>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reload the config file between episodes when it changes
    #[arg(long, requires = "config")]
    watch: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AgentArg {
    CaveCrawler,
    PogoBouncer,
}

impl From<AgentArg> for AgentKind {
    fn from(arg: AgentArg) -> Self {
        match arg {
            AgentArg::CaveCrawler => AgentKind::CaveCrawler,
            AgentArg::PogoBouncer => AgentKind::PogoBouncer,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Scripted,
    Zero,
    Random,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Scripted => PolicyKind::Scripted,
            PolicyArg::Zero => PolicyKind::Zero,
            PolicyArg::Random => PolicyKind::Random,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stdout().is_terminal());
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let options = RunOptions {
        policy: cli.policy.into(),
        episodes: cli.episodes,
        config_path: cli.config,
        watch: cli.watch,
        overrides: Overrides {
            agent: cli.agent.map(Into::into),
            max_steps: cli.max_steps,
            dt: cli.dt,
            seed: cli.seed,
        },
    };
    tracing::info!(?options, "starting run");
    app::run(&options)?;
    Ok(())
}

//! # Arena Scheduler
//!
//! Builds the scene for the selected agent and runs the fixed-step loop: step
//! the world, tick the control loop, reset once the episode is over. With
//! `--watch` the config file is re-read between episodes and the scene is
//! rebuilt from it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use physics::PhysicsSim;
use rl::{
    Agent, AgentKind, ArenaConfig, BehaviorMode, CaveCrawler, ControlLoop, EpisodeEnd, PogoBouncer, RandomPolicy,
    ZeroPolicy,
};
use tracing::{error, info};

use crate::watcher::ConfigWatcher;

/// Step limit used when neither the config nor the command line sets one.
pub const DEFAULT_MAX_STEPS: u32 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolicyKind {
    /// The agent's own heuristic, without operator input.
    Scripted,
    Zero,
    Random,
}

/// Values from the command line that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub agent: Option<AgentKind>,
    pub max_steps: Option<u32>,
    pub dt: Option<f32>,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub policy: PolicyKind,
    pub episodes: u32,
    pub config_path: Option<PathBuf>,
    pub watch: bool,
    pub overrides: Overrides,
}

impl RunOptions {
    /// Read the config file (or defaults), apply overrides and validate.
    pub fn load_config(&self) -> Result<ArenaConfig> {
        let mut config = match &self.config_path {
            Some(path) => ArenaConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => ArenaConfig::default(),
        };
        let o = &self.overrides;
        if let Some(agent) = o.agent {
            config.agent = agent;
        }
        if let Some(max_steps) = o.max_steps {
            config.settings.max_steps = max_steps;
        }
        if let Some(dt) = o.dt {
            config.settings.dt = dt;
        }
        if let Some(seed) = o.seed {
            config.settings.seed = seed;
        }
        if config.settings.max_steps == 0 {
            config.settings.max_steps = DEFAULT_MAX_STEPS;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub number: u64,
    pub steps: u32,
    pub reward: f32,
    pub end: Option<EpisodeEnd>,
}

/// Episodes run with one scene, and whether a reload cut them short.
struct Segment {
    episodes: Vec<EpisodeSummary>,
    reload: bool,
}

/// Run `options.episodes` episodes headless.
///
/// # Errors
///
/// Fails on an unreadable or invalid initial config, or if the watcher
/// cannot start. Bad configs seen while watching are logged and skipped.
pub fn run(options: &RunOptions) -> Result<Vec<EpisodeSummary>> {
    let mut config = options.load_config()?;
    let watcher = match (&options.config_path, options.watch) {
        (Some(path), true) => Some(ConfigWatcher::start(path)?),
        _ => None,
    };

    let total = options.episodes as usize;
    let mut summaries = Vec::with_capacity(total);
    while summaries.len() < total {
        let remaining = total - summaries.len();
        // a reload rebuilds the loop, whose numbering starts over
        let episodes_run = summaries.len() as u64;
        let segment = match config.agent {
            AgentKind::CaveCrawler => {
                let (world, agent) = CaveCrawler::scene(config.cave_crawler.clone());
                run_agent(world, agent, &config, options.policy, episodes_run, remaining, watcher.as_ref())?
            }
            AgentKind::PogoBouncer => {
                let (world, agent) = PogoBouncer::scene(config.pogo_bouncer.clone());
                run_agent(world, agent, &config, options.policy, episodes_run, remaining, watcher.as_ref())?
            }
        };
        summaries.extend(segment.episodes);
        if segment.reload {
            match options.load_config() {
                Ok(reloaded) => {
                    info!(agent = ?reloaded.agent, "config reloaded");
                    config = reloaded;
                }
                Err(err) => error!("keeping previous config: {err:#}"),
            }
        }
    }

    let mean = if summaries.is_empty() {
        0.0
    } else {
        summaries.iter().map(|s| s.reward).sum::<f32>() / summaries.len() as f32
    };
    info!(episodes = summaries.len(), mean_reward = mean, "run finished");
    Ok(summaries)
}

fn behavior(policy: PolicyKind, arity: usize, seed: u64) -> BehaviorMode {
    match policy {
        PolicyKind::Scripted => BehaviorMode::Heuristic,
        PolicyKind::Zero => BehaviorMode::inference(ZeroPolicy { arity }),
        PolicyKind::Random => BehaviorMode::inference(RandomPolicy::new(arity, seed)),
    }
}

fn run_agent<A: Agent>(
    mut world: PhysicsSim,
    agent: A,
    config: &ArenaConfig,
    policy: PolicyKind,
    episodes_run: u64,
    remaining: usize,
    watcher: Option<&ConfigWatcher>,
) -> Result<Segment> {
    let behavior = behavior(policy, agent.action_size(), config.settings.seed);
    let mut control = ControlLoop::new(agent, behavior, config.settings);
    control.initialize(&mut world)?;
    let dt = control.settings().dt;

    let mut episodes = Vec::new();
    loop {
        world.step(dt);
        if !control.tick(&mut world, dt).done {
            continue;
        }

        let episode = control.episode();
        let number = episodes_run + episode.number();
        episodes.push(EpisodeSummary {
            number,
            steps: episode.steps(),
            reward: episode.cumulative_reward(),
            end: episode.end(),
        });
        let breakdown: Vec<String> = episode
            .rewards()
            .iter()
            .map(|(term, value)| format!("{term}={value:.3}"))
            .collect();
        info!(
            episode = number,
            reward = %control.reward_text(),
            terms = %breakdown.join(" "),
            "episode summary"
        );

        if episodes.len() >= remaining {
            return Ok(Segment {
                episodes,
                reload: false,
            });
        }
        if watcher.is_some_and(ConfigWatcher::changed) {
            return Ok(Segment { episodes, reload: true });
        }
        control.reset(&mut world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(agent: AgentKind, policy: PolicyKind) -> RunOptions {
        RunOptions {
            policy,
            episodes: 2,
            config_path: None,
            watch: false,
            overrides: Overrides {
                agent: Some(agent),
                max_steps: Some(40),
                ..Overrides::default()
            },
        }
    }

    #[test]
    fn runs_the_requested_number_of_episodes() {
        for agent in [AgentKind::CaveCrawler, AgentKind::PogoBouncer] {
            for policy in [PolicyKind::Scripted, PolicyKind::Zero, PolicyKind::Random] {
                let summaries = run(&options(agent, policy)).unwrap();
                assert_eq!(summaries.len(), 2);
                assert!(summaries.iter().all(|s| s.steps <= 40 && s.reward.is_finite()));
                assert_eq!(summaries[1].number, 2);
            }
        }
    }

    #[test]
    fn numbering_continues_across_scenes() {
        let opts = options(AgentKind::CaveCrawler, PolicyKind::Zero);
        let config = opts.load_config().unwrap();
        let (world, agent) = CaveCrawler::scene(config.cave_crawler.clone());
        let segment = run_agent(world, agent, &config, PolicyKind::Zero, 2, 2, None).unwrap();
        assert!(!segment.reload);
        let numbers: Vec<u64> = segment.episodes.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[test]
    fn zero_max_steps_gets_a_limit() {
        let mut opts = options(AgentKind::PogoBouncer, PolicyKind::Zero);
        opts.overrides.max_steps = Some(0);
        let config = opts.load_config().unwrap();
        assert_eq!(config.settings.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn overrides_beat_defaults() {
        let mut opts = options(AgentKind::PogoBouncer, PolicyKind::Zero);
        opts.overrides.seed = Some(77);
        opts.overrides.dt = Some(0.01);
        let config = opts.load_config().unwrap();
        assert_eq!(config.agent, AgentKind::PogoBouncer);
        assert_eq!(config.settings.seed, 77);
        assert!((config.settings.dt - 0.01).abs() < 1e-9);
    }
}

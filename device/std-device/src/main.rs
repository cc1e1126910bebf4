use std::collections::BTreeMap;
use std::time::Duration;

use clap::Parser;
use hoverloop::episode::EpisodeStats;
use hoverloop::{Config, HoverEnv};

mod pilot;
mod ticker;

use pilot::Pilot;
use ticker::Ticker;

#[derive(clap::Parser)]
struct Args {
    /// Path to the configuration file of the controller and the episodes
    #[clap(short, long)]
    config: Option<String>,

    /// Path to the configuration file for the simulation
    #[clap(short, long)]
    sim: Option<String>,

    /// Number of episodes to run
    #[clap(short, long, default_value_t = 10)]
    episodes: u32,

    /// Override the seed of the episode randomisation
    #[clap(long)]
    seed: Option<u64>,

    /// Pace the decision steps to wall-clock time
    #[clap(long)]
    realtime: bool,
}

fn setup_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .format_timestamp_nanos()
        .init();
}

/// Outcomes and returns over all episodes of a run.
#[derive(Debug, Default)]
struct Summary {
    episodes: u32,
    total_return: f32,
    collisions: u32,
    outcomes: BTreeMap<String, u32>,
}

impl Summary {
    fn add(&mut self, stats: &EpisodeStats) {
        self.episodes += 1;
        self.total_return += stats.total_reward;
        self.collisions += stats.collisions;
        let outcome = stats.end.map_or("Aborted".to_string(), |end| format!("{end:?}"));
        *self.outcomes.entry(outcome).or_default() += 1;
    }

    fn mean_return(&self) -> f32 {
        match self.episodes {
            0 => 0.0,
            n => self.total_return / n as f32,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_logging();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => hoverloop::config::load_from_file_path(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.episode.seed = seed;
    }

    let sim_config = match &args.sim {
        Some(path) => hoverloop_sim::config::load_from_file_path(path)?,
        None => hoverloop_sim::Configuration::default(),
    };

    let (body, wind) = hoverloop_sim::initialize(sim_config)?;
    let mut env = HoverEnv::with_ambient(&config, body, wind)?;
    let pilot = Pilot::default();

    let decision_dt = Duration::from_secs_f32(env.schedule().decision_dt());
    let mut ticker = args.realtime.then(|| Ticker::every(decision_dt));

    let mut summary = Summary::default();
    for _ in 0..args.episodes {
        let mut obs = env.reset();
        if let Some(ticker) = ticker.as_mut() {
            ticker.reset();
        }

        loop {
            let transition = env.step(&pilot.act(&obs))?;
            obs = transition.observation;

            if let Some(ticker) = ticker.as_mut() {
                ticker.next();
            }

            if transition.done() {
                break;
            }
        }

        summary.add(env.stats());
    }

    log::info!(
        "{} episodes, mean return {:.3}, {} collisions, outcomes {:?}",
        summary.episodes,
        summary.mean_return(),
        summary.collisions,
        summary.outcomes
    );

    Ok(())
}

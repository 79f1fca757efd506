#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ml_relational_spread::config::AppConfig;
use ml_relational_spread::training::{build_trainers, Trainer};
use ml_relational_spread::world::MultiAgentEnv;

/// Train relational DQN role groups on the spread world.
#[derive(Parser)]
#[command(name = "train", about = "Train relational multi-agent policies on the spread world")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Resume from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Evaluate the (restored) policies instead of training
    #[arg(long)]
    benchmark: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ml_relational_spread=info,train=info,warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    init_logging()?;

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if let Some(lr) = cli.lr {
        app_config.dqn.learning_rate = lr;
    }
    if let Some(seed) = cli.seed {
        app_config.scenario.seed = Some(seed);
    }
    app_config.validate().context("validating config overrides")?;

    let scenario = &app_config.scenario;
    let mut env = MultiAgentEnv::new(scenario);
    let mut trainers =
        build_trainers(scenario, &app_config.dqn).context("building role trainers")?;
    let mut trainer = Trainer::new(
        app_config.training.clone(),
        scenario,
        app_config.checkpoint.clone(),
    )
    .context("building trainer")?;

    info!(
        agents = scenario.num_agents,
        landmarks = scenario.num_landmarks,
        observing_range = scenario.observing_range,
        groups = trainers.len(),
        "spread world ready"
    );

    if cli.resume || cli.benchmark {
        match trainer
            .restore(&mut trainers)
            .context("restoring checkpoint")?
        {
            Some(episode) => info!(episode, "resumed"),
            None => info!("starting from fresh weights"),
        }
    }

    if cli.benchmark {
        let report = trainer
            .benchmark(&mut env, &mut trainers)
            .context("running benchmark")?;
        println!(
            "steps={} episodes={} collisions={:.4} occupied_landmarks={:.4} min_dists={:.4}",
            report.steps.len(),
            report.episodes,
            report.mean_collisions(),
            report.mean_occupied_landmarks(),
            report.mean_min_dists(),
        );
        return Ok(());
    }

    let report = trainer
        .train(&mut env, &mut trainers)
        .context("training")?;
    if let Some(last) = report.final_ep_rewards.last() {
        info!(
            episode = report.last_episode,
            steps = report.train_steps,
            mean_episode_reward = last,
            "done"
        );
    }
    Ok(())
}

use std::collections::HashSet;
use std::ops::Range;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::ai::{
    RelationalDqnConfig, RelationalDqnTrainer, RoleInputs, RoleTrainer, Transition,
    UpdateMetrics,
};
use crate::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointMetrics};
use crate::error::{CheckpointError, ShapeError, TrainingError};
use crate::training::metrics::{EpisodeResult, TimingMetrics, TrainingMetrics};
use crate::world::{AdjacencyContext, BenchmarkData, MultiAgentEnv, Role, RoleSpec, ScenarioConfig};

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub max_episode_len: usize,
    /// Episodes between progress logs and checkpoints.
    pub save_rate: usize,
    /// Benchmark mode stops at the first episode end past this many steps.
    pub benchmark_iters: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 60_000,
            max_episode_len: 30,
            save_rate: 1000,
            benchmark_iters: 100_000,
        }
    }
}

/// A contiguous block of agents sharing one role, one trainer and one
/// network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGroup {
    pub role: Role,
    pub agents: Range<usize>,
}

impl RoleGroup {
    /// Lay the role blocks out in agent order. Every agent must belong to
    /// exactly one group and each role may appear once.
    pub fn from_specs(specs: &[RoleSpec], num_agents: usize) -> Result<Vec<RoleGroup>, TrainingError> {
        let mut seen = HashSet::new();
        let mut groups = Vec::with_capacity(specs.len());
        let mut start = 0;
        for spec in specs {
            if !seen.insert(spec.role) {
                return Err(TrainingError::RoleOverlap(spec.role.name()));
            }
            if spec.count == 0 {
                continue;
            }
            groups.push(RoleGroup {
                role: spec.role,
                agents: start..start + spec.count,
            });
            start += spec.count;
        }
        if start != num_agents {
            return Err(TrainingError::RoleCoverage {
                covered: start,
                agents: num_agents,
            });
        }
        Ok(groups)
    }

    pub fn name(&self) -> &'static str {
        self.role.name()
    }
}

/// One relational DQN trainer per role group of `scenario`.
pub fn build_trainers(
    scenario: &ScenarioConfig,
    config: &RelationalDqnConfig,
) -> Result<Vec<Box<dyn RoleTrainer>>, TrainingError> {
    let groups = RoleGroup::from_specs(&scenario.roles, scenario.num_agents)?;
    Ok(groups
        .into_iter()
        .map(|group| {
            Box::new(RelationalDqnTrainer::new(
                group.name(),
                group.agents,
                scenario,
                config.clone(),
            )) as Box<dyn RoleTrainer>
        })
        .collect())
}

/// Reward curves of a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingReport {
    /// Total reward of every finished episode, in order.
    pub episode_rewards: Vec<f32>,
    /// Per-agent reward of every finished episode, in order.
    pub agent_rewards: Vec<Vec<f32>>,
    /// Mean episode reward of each log window.
    pub final_ep_rewards: Vec<f32>,
    /// Per-agent mean episode reward of each log window.
    pub final_ep_ag_rewards: Vec<Vec<f32>>,
    pub train_steps: usize,
    /// Episode counter at the end of the run, resumed offset included.
    pub last_episode: usize,
}

/// Per-step evaluation data collected without learning.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkReport {
    /// One entry per agent for every step.
    pub steps: Vec<Vec<BenchmarkData>>,
    pub episodes: usize,
}

impl BenchmarkReport {
    pub fn mean_collisions(&self) -> f32 {
        self.mean_of(|d| d.collisions as f32)
    }

    pub fn mean_occupied_landmarks(&self) -> f32 {
        self.mean_of(|d| d.occupied_landmarks as f32)
    }

    pub fn mean_min_dists(&self) -> f32 {
        self.mean_of(|d| d.min_dists)
    }

    fn mean_of(&self, f: impl Fn(&BenchmarkData) -> f32) -> f32 {
        let values: Vec<f32> = self.steps.iter().flatten().map(f).collect();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Drives the environment and the role trainers.
pub struct Trainer {
    config: TrainerConfig,
    groups: Vec<RoleGroup>,
    checkpoint_manager: CheckpointManager,
    start_episode: usize,
}

impl Trainer {
    pub fn new(
        config: TrainerConfig,
        scenario: &ScenarioConfig,
        checkpoint: CheckpointManagerConfig,
    ) -> Result<Self, TrainingError> {
        let groups = RoleGroup::from_specs(&scenario.roles, scenario.num_agents)?;
        Ok(Trainer {
            config,
            groups,
            checkpoint_manager: CheckpointManager::new(checkpoint),
            start_episode: 0,
        })
    }

    pub fn groups(&self) -> &[RoleGroup] {
        &self.groups
    }

    /// Resume from the latest checkpoint if one exists. Returns the episode
    /// it was saved at.
    pub fn restore(
        &mut self,
        trainers: &mut [Box<dyn RoleTrainer>],
    ) -> Result<Option<usize>, TrainingError> {
        self.check_trainers(trainers)?;
        let data = match self.checkpoint_manager.load_latest() {
            Ok(data) => data,
            Err(CheckpointError::NoLatestSymlink(dir)) => {
                warn!(dir = %dir.display(), "no checkpoint to restore, starting fresh");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        self.checkpoint_manager.restore_trainers(&data, trainers)?;
        self.start_episode = data.metadata.episode;
        Ok(Some(data.metadata.episode))
    }

    /// Run the training loop for `num_episodes` episodes.
    pub fn train(
        &self,
        env: &mut MultiAgentEnv,
        trainers: &mut [Box<dyn RoleTrainer>],
    ) -> Result<TrainingReport, TrainingError> {
        self.check_trainers(trainers)?;
        let n = env.num_agents();
        let mut metrics = TrainingMetrics::with_capacity(self.config.save_rate.max(1));
        let mut timing = TimingMetrics::new();
        let mut report = TrainingReport::default();

        let (mut obs, mut adjacency) = env.reset()?;
        let mut episode_rewards = vec![0.0f32; n];
        let mut episode_step = 0;
        let mut train_step = 0;
        let mut finished = 0;

        info!(
            episodes = self.config.num_episodes,
            start = self.start_episode,
            agents = n,
            groups = self.groups.len(),
            "starting training"
        );

        while finished < self.config.num_episodes {
            let actions = select_actions(trainers, &obs, &adjacency, n)?;
            let outcome = env.step(&actions)?;
            episode_step += 1;
            let done = outcome.dones.iter().all(|&d| d);
            let terminal = episode_step >= self.config.max_episode_len;

            for trainer in trainers.iter_mut() {
                let g = trainer.group();
                trainer.experience(Transition {
                    observations: obs[g.clone()].to_vec(),
                    adjacency: adjacency[g.clone()].to_vec(),
                    actions: actions[g.clone()].to_vec(),
                    rewards: outcome.rewards[g.clone()].to_vec(),
                    next_observations: outcome.observations[g.clone()].to_vec(),
                    next_adjacency: outcome.adjacency[g.clone()].to_vec(),
                    dones: outcome.dones[g].to_vec(),
                    terminal,
                });
            }
            for (total, reward) in episode_rewards.iter_mut().zip(&outcome.rewards) {
                *total += reward;
            }
            obs = outcome.observations;
            adjacency = outcome.adjacency;
            train_step += 1;

            for trainer in trainers.iter_mut() {
                trainer.pre_update();
            }
            let update_start = Instant::now();
            let mut updated = false;
            for index in 0..trainers.len() {
                if let Some(update) = update_trainer(trainers, index, train_step)? {
                    metrics.record_update(update.loss);
                    updated = true;
                }
            }
            if updated {
                timing.record_update_time(update_start.elapsed());
            }

            if done || terminal {
                let total_reward = episode_rewards.iter().sum();
                metrics.record_episode(EpisodeResult {
                    total_reward,
                    agent_rewards: episode_rewards.clone(),
                    length: episode_step,
                });
                timing.record_episode();
                report.episode_rewards.push(total_reward);
                report.agent_rewards.push(episode_rewards.clone());
                finished += 1;

                (obs, adjacency) = env.reset()?;
                episode_rewards.fill(0.0);
                episode_step = 0;

                let episode = self.start_episode + finished;
                let save_rate = self.config.save_rate.max(1);
                if finished % save_rate == 0 || finished == self.config.num_episodes {
                    let window = save_rate.min(finished);
                    let mean_reward = metrics.mean_episode_reward(window);
                    let agent_means = metrics.mean_agent_rewards(window);
                    info!(
                        steps = train_step,
                        episode,
                        mean_episode_reward = mean_reward,
                        agent_episode_rewards = ?agent_means,
                        loss = metrics.average_loss(window),
                        episode_len = metrics.average_episode_length(window),
                        epsilon = trainers.first().map(|t| t.exploration_rate()).unwrap_or(0.0),
                        eps_per_sec = timing.episodes_per_sec(),
                        update_ms = timing.avg_update_ms(100),
                        secs = timing.window_secs(),
                        "progress"
                    );
                    report.final_ep_rewards.push(mean_reward);
                    report.final_ep_ag_rewards.push(agent_means.clone());

                    let checkpoint_start = Instant::now();
                    self.save_checkpoint(
                        trainers,
                        &CheckpointMetrics {
                            mean_episode_reward: mean_reward,
                            agent_rewards: agent_means,
                            current_loss: metrics.average_loss(window),
                            training_steps: trainers.iter().map(|t| t.update_count()).sum(),
                        },
                        episode,
                    );
                    timing.record_overhead(checkpoint_start.elapsed());
                    timing.reset_window();
                }
            }
        }

        report.train_steps = train_step;
        report.last_episode = self.start_episode + finished;
        info!(
            episodes = metrics.total_episodes(),
            steps = train_step,
            "training complete"
        );
        Ok(report)
    }

    /// Roll the greedy policies without learning until more than
    /// `benchmark_iters` steps are collected, finishing the current episode.
    pub fn benchmark(
        &self,
        env: &mut MultiAgentEnv,
        trainers: &mut [Box<dyn RoleTrainer>],
    ) -> Result<BenchmarkReport, TrainingError> {
        self.check_trainers(trainers)?;
        let n = env.num_agents();
        let saved: Vec<_> = trainers.iter_mut().map(|t| t.enter_eval_mode()).collect();

        let result = self.run_benchmark(env, trainers, n);

        for (trainer, state) in trainers.iter_mut().zip(saved) {
            trainer.exit_eval_mode(state);
        }
        let report = result?;
        info!(
            steps = report.steps.len(),
            episodes = report.episodes,
            collisions = report.mean_collisions(),
            occupied_landmarks = report.mean_occupied_landmarks(),
            min_dists = report.mean_min_dists(),
            "benchmark finished"
        );
        Ok(report)
    }

    fn run_benchmark(
        &self,
        env: &mut MultiAgentEnv,
        trainers: &mut [Box<dyn RoleTrainer>],
        num_agents: usize,
    ) -> Result<BenchmarkReport, TrainingError> {
        let mut report = BenchmarkReport::default();
        let (mut obs, mut adjacency) = env.reset()?;
        let mut episode_step = 0;
        loop {
            let actions = select_actions(trainers, &obs, &adjacency, num_agents)?;
            let outcome = env.step(&actions)?;
            episode_step += 1;
            report.steps.push(outcome.info);
            let done = outcome.dones.iter().all(|&d| d);
            let terminal = episode_step >= self.config.max_episode_len;
            obs = outcome.observations;
            adjacency = outcome.adjacency;

            if done || terminal {
                report.episodes += 1;
                if report.steps.len() > self.config.benchmark_iters {
                    return Ok(report);
                }
                (obs, adjacency) = env.reset()?;
                episode_step = 0;
            }
        }
    }

    fn save_checkpoint(
        &self,
        trainers: &[Box<dyn RoleTrainer>],
        metrics: &CheckpointMetrics,
        episode: usize,
    ) {
        match self
            .checkpoint_manager
            .save_checkpoint(trainers, metrics, episode)
        {
            Ok(path) => debug!(path = %path.display(), "checkpoint saved"),
            Err(e) => warn!(error = %e, episode, "checkpoint failed"),
        }
    }

    /// Trainers must match the role groups one to one, in order.
    fn check_trainers(&self, trainers: &[Box<dyn RoleTrainer>]) -> Result<(), TrainingError> {
        if trainers.len() != self.groups.len() {
            return Err(TrainingError::TrainerCount {
                expected: self.groups.len(),
                actual: trainers.len(),
            });
        }
        for (index, (trainer, group)) in trainers.iter().zip(&self.groups).enumerate() {
            if trainer.group() != group.agents {
                return Err(TrainingError::GroupMismatch {
                    index,
                    expected: group.agents.clone(),
                    actual: trainer.group(),
                });
            }
        }
        Ok(())
    }
}

/// Ask every trainer for its group's actions and lay them out in agent order.
fn select_actions(
    trainers: &mut [Box<dyn RoleTrainer>],
    obs: &[Vec<f32>],
    adjacency: &[AdjacencyContext],
    num_agents: usize,
) -> Result<Vec<usize>, ShapeError> {
    let mut actions = vec![0; num_agents];
    for trainer in trainers.iter_mut() {
        let group = trainer.group();
        let chosen = trainer.action(&RoleInputs {
            observations: &obs[group.clone()],
            adjacency: &adjacency[group.clone()],
        })?;
        if chosen.len() != group.len() {
            return Err(ShapeError::AgentCount {
                expected: group.len(),
                actual: chosen.len(),
            });
        }
        actions[group].copy_from_slice(&chosen);
    }
    Ok(actions)
}

/// Update one trainer with every other trainer visible as a peer.
fn update_trainer(
    trainers: &mut [Box<dyn RoleTrainer>],
    index: usize,
    step: usize,
) -> Result<Option<UpdateMetrics>, ShapeError> {
    let (before, rest) = trainers.split_at_mut(index);
    let Some((current, after)) = rest.split_first_mut() else {
        return Ok(None);
    };
    let peers: Vec<&dyn RoleTrainer> = before.iter().chain(after.iter()).map(|t| &**t).collect();
    current.update(&peers, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::ai::EvalState;
    use crate::world::NUM_ACTIONS;

    fn two_roles(adversaries: usize, cooperative: usize) -> Vec<RoleSpec> {
        vec![
            RoleSpec {
                role: Role::Adversary,
                count: adversaries,
            },
            RoleSpec {
                role: Role::Cooperative,
                count: cooperative,
            },
        ]
    }

    #[test]
    fn test_role_groups_are_contiguous() {
        let groups = RoleGroup::from_specs(&two_roles(2, 3), 5).unwrap();
        assert_eq!(
            groups,
            vec![
                RoleGroup {
                    role: Role::Adversary,
                    agents: 0..2
                },
                RoleGroup {
                    role: Role::Cooperative,
                    agents: 2..5
                },
            ]
        );
        assert_eq!(groups[0].name(), "adversaries");
    }

    #[test]
    fn test_empty_role_block_is_skipped() {
        let groups = RoleGroup::from_specs(&two_roles(0, 4), 4).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].role, Role::Cooperative);
    }

    #[test]
    fn test_role_coverage_is_checked() {
        let err = RoleGroup::from_specs(&two_roles(2, 2), 5).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::RoleCoverage {
                covered: 4,
                agents: 5
            }
        ));
    }

    #[test]
    fn test_duplicate_role_is_rejected() {
        let specs = vec![
            RoleSpec {
                role: Role::Adversary,
                count: 2,
            },
            RoleSpec {
                role: Role::Adversary,
                count: 3,
            },
        ];
        let err = RoleGroup::from_specs(&specs, 5).unwrap_err();
        assert!(matches!(err, TrainingError::RoleOverlap("adversaries")));
    }

    /// Acts with a fixed action and counts calls. Panics if it is updated
    /// while in eval mode or handed itself as a peer.
    struct ScriptedTrainer {
        name: String,
        group: Range<usize>,
        action: usize,
        transitions: usize,
        pre_updates: usize,
        updates: usize,
        eval: bool,
    }

    impl ScriptedTrainer {
        fn boxed(group: Range<usize>, action: usize) -> Box<dyn RoleTrainer> {
            Box::new(ScriptedTrainer {
                name: format!("scripted_{}", group.start),
                group,
                action,
                transitions: 0,
                pre_updates: 0,
                updates: 0,
                eval: false,
            })
        }
    }

    impl RoleTrainer for ScriptedTrainer {
        fn name(&self) -> &str {
            &self.name
        }

        fn algorithm_name(&self) -> &str {
            "scripted"
        }

        fn group(&self) -> Range<usize> {
            self.group.clone()
        }

        fn action(&mut self, inputs: &RoleInputs<'_>) -> Result<Vec<usize>, ShapeError> {
            assert_eq!(inputs.observations.len(), self.group.len());
            assert_eq!(inputs.adjacency.len(), self.group.len());
            Ok(vec![self.action; self.group.len()])
        }

        fn experience(&mut self, transition: Transition) {
            assert_eq!(transition.actions, vec![self.action; self.group.len()]);
            self.transitions += 1;
        }

        fn pre_update(&mut self) {
            self.pre_updates += 1;
        }

        fn update(
            &mut self,
            peers: &[&dyn RoleTrainer],
            _step: usize,
        ) -> Result<Option<UpdateMetrics>, ShapeError> {
            assert!(!self.eval);
            assert_eq!(self.transitions, self.pre_updates);
            assert!(peers.iter().all(|peer| peer.group() != self.group));
            self.updates += 1;
            Ok(Some(UpdateMetrics::default()))
        }

        fn update_count(&self) -> usize {
            self.updates
        }

        fn enter_eval_mode(&mut self) -> EvalState {
            self.eval = true;
            EvalState::NoOp
        }

        fn exit_eval_mode(&mut self, _state: EvalState) {
            self.eval = false;
        }

        fn save_weights_to_dir(&self, _dir: &Path) -> Result<(), CheckpointError> {
            Ok(())
        }

        fn load_weights_from_dir(&mut self, _dir: &Path) -> Result<(), CheckpointError> {
            Ok(())
        }

        fn training_state_json(&self) -> Result<String, CheckpointError> {
            Ok("{}".to_string())
        }

        fn restore_training_state_json(&mut self, _json: &str) -> Result<(), CheckpointError> {
            Ok(())
        }
    }

    fn scenario(roles: Vec<RoleSpec>, num_agents: usize) -> ScenarioConfig {
        ScenarioConfig {
            num_agents,
            num_landmarks: 3,
            roles,
            seed: Some(21),
            ..Default::default()
        }
    }

    fn trainer_config(num_episodes: usize) -> TrainerConfig {
        TrainerConfig {
            num_episodes,
            max_episode_len: 5,
            save_rate: 2,
            benchmark_iters: 12,
        }
    }

    fn checkpoint_config(dir: &Path) -> CheckpointManagerConfig {
        CheckpointManagerConfig {
            checkpoint_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_training_loop_counts_steps_and_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario(two_roles(1, 2), 3);
        let trainer =
            Trainer::new(trainer_config(4), &scenario, checkpoint_config(dir.path())).unwrap();
        let mut env = MultiAgentEnv::new(&scenario);
        let mut trainers = vec![
            ScriptedTrainer::boxed(0..1, 0),
            ScriptedTrainer::boxed(1..3, 1),
        ];

        let report = trainer.train(&mut env, &mut trainers).unwrap();
        assert_eq!(report.train_steps, 20);
        assert_eq!(report.episode_rewards.len(), 4);
        assert_eq!(report.agent_rewards[0].len(), 3);
        assert_eq!(report.final_ep_rewards.len(), 2);
        assert_eq!(report.last_episode, 4);
        for (total, per_agent) in report.episode_rewards.iter().zip(&report.agent_rewards) {
            assert!((total - per_agent.iter().sum::<f32>()).abs() < 1e-4);
            assert!(*total <= 0.0);
        }
        for t in &trainers {
            assert_eq!(t.update_count(), 20);
        }
        // Two log windows, each with a checkpoint.
        assert!(dir.path().join("checkpoint_0000002").is_dir());
        assert!(dir.path().join("checkpoint_0000004").is_dir());
    }

    #[test]
    fn test_trainers_see_each_other_as_peers() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario(two_roles(2, 1), 3);
        let trainer =
            Trainer::new(trainer_config(1), &scenario, checkpoint_config(dir.path())).unwrap();
        let mut trainers = vec![
            ScriptedTrainer::boxed(0..2, 2),
            ScriptedTrainer::boxed(2..3, 3),
        ];
        for index in 0..trainers.len() {
            update_trainer(&mut trainers, index, 1).unwrap();
        }
        assert_eq!(trainers[0].update_count(), 1);
        assert_eq!(trainers[1].update_count(), 1);
        assert!(update_trainer(&mut trainers, 2, 1).unwrap().is_none());

        let mut env = MultiAgentEnv::new(&scenario);
        trainer.train(&mut env, &mut trainers).unwrap();
        assert_eq!(trainers[0].update_count(), 6);
    }

    #[test]
    fn test_mismatched_trainers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario(two_roles(1, 2), 3);
        let trainer =
            Trainer::new(trainer_config(1), &scenario, checkpoint_config(dir.path())).unwrap();
        let mut env = MultiAgentEnv::new(&scenario);

        let mut too_few = vec![ScriptedTrainer::boxed(0..3, 0)];
        let err = trainer.train(&mut env, &mut too_few).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::TrainerCount {
                expected: 2,
                actual: 1
            }
        ));

        let mut shifted = vec![
            ScriptedTrainer::boxed(0..2, 0),
            ScriptedTrainer::boxed(2..3, 0),
        ];
        let err = trainer.train(&mut env, &mut shifted).unwrap_err();
        assert!(matches!(err, TrainingError::GroupMismatch { index: 0, .. }));
    }

    #[test]
    fn test_benchmark_collects_whole_episodes_without_updates() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario(two_roles(3, 0), 3);
        let trainer =
            Trainer::new(trainer_config(1), &scenario, checkpoint_config(dir.path())).unwrap();
        let mut env = MultiAgentEnv::new(&scenario);
        let mut trainers = vec![ScriptedTrainer::boxed(0..3, NUM_ACTIONS - 1)];

        let report = trainer.benchmark(&mut env, &mut trainers).unwrap();
        // 12 iterations rounded up to whole 5-step episodes.
        assert_eq!(report.steps.len(), 15);
        assert_eq!(report.episodes, 3);
        assert!(report.steps.iter().all(|s| s.len() == 3));
        assert!(report.mean_min_dists() >= 0.0);
        assert_eq!(trainers[0].update_count(), 0);
    }

    #[test]
    fn test_benchmark_runs_past_an_exact_episode_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario(two_roles(3, 0), 3);
        let config = TrainerConfig {
            benchmark_iters: 10,
            ..trainer_config(1)
        };
        let trainer = Trainer::new(config, &scenario, checkpoint_config(dir.path())).unwrap();
        let mut env = MultiAgentEnv::new(&scenario);
        let mut trainers = vec![ScriptedTrainer::boxed(0..3, 0)];

        let report = trainer.benchmark(&mut env, &mut trainers).unwrap();
        // Ten steps end an episode but do not exceed the limit.
        assert_eq!(report.steps.len(), 15);
        assert_eq!(report.episodes, 3);
    }

    #[test]
    fn test_restore_without_checkpoint_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario(two_roles(1, 2), 3);
        let mut trainer =
            Trainer::new(trainer_config(1), &scenario, checkpoint_config(dir.path())).unwrap();
        let mut trainers = vec![
            ScriptedTrainer::boxed(0..1, 0),
            ScriptedTrainer::boxed(1..3, 0),
        ];
        assert_eq!(trainer.restore(&mut trainers).unwrap(), None);
    }

    #[test]
    fn test_resume_continues_episode_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = ScenarioConfig {
            num_agents: 2,
            num_landmarks: 2,
            seed: Some(8),
            roles: two_roles(2, 0),
            ..Default::default()
        };
        let dqn = RelationalDqnConfig {
            num_units: 8,
            heads: 2,
            head_dim: 2,
            relation_dim: 4,
            batch_size: 4,
            min_replay_size: 4,
            replay_capacity: 32,
            update_interval: 2,
            ..Default::default()
        };

        let first =
            Trainer::new(trainer_config(2), &scenario, checkpoint_config(dir.path())).unwrap();
        let mut env = MultiAgentEnv::new(&scenario);
        let mut trainers = build_trainers(&scenario, &dqn).unwrap();
        first.train(&mut env, &mut trainers).unwrap();
        let updates = trainers[0].update_count();
        assert!(updates > 0);

        let mut second =
            Trainer::new(trainer_config(2), &scenario, checkpoint_config(dir.path())).unwrap();
        let mut resumed = build_trainers(&scenario, &dqn).unwrap();
        assert_eq!(second.restore(&mut resumed).unwrap(), Some(2));
        assert_eq!(resumed[0].update_count(), updates);

        let report = second.train(&mut env, &mut resumed).unwrap();
        assert_eq!(report.last_episode, 4);
        assert!(dir.path().join("checkpoint_0000004").is_dir());
    }
}

use std::ops::Range;
use std::path::Path;

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::{ElementConversion, TensorData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::ai::agent::{EvalState, RoleInputs, RoleTrainer, Transition, UpdateMetrics};
use crate::ai::networks::{RelationalPolicyNetwork, RelationalPolicyNetworkConfig};
use crate::ai::state_encoding::{
    context_vector, encode_adjacency, encode_adjacency_batch, encode_observations,
    encode_observations_batch,
};
use crate::checkpoint::RelationalDqnTrainingState;
use crate::error::{CheckpointError, ShapeError};
use crate::training::replay_buffer::ReplayBuffer;
use crate::world::{ScenarioConfig, NUM_ACTIONS};

type InferBackend = NdArray<f32>;
type TrainBackend = Autodiff<InferBackend>;

const ALGORITHM: &str = "relational-dqn";
const NETWORK_FILE: &str = "relational_network";
const TARGET_FILE: &str = "target_network";

/// Relational DQN hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RelationalDqnConfig {
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_end: f32,
    /// Environment steps over which epsilon decays linearly.
    pub epsilon_decay_steps: usize,
    /// Learning steps between target network syncs.
    pub target_update_interval: usize,
    /// Environment steps between learning steps.
    pub update_interval: usize,
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub min_replay_size: usize,
    pub num_units: usize,
    pub heads: usize,
    pub head_dim: usize,
    pub relation_dim: usize,
}

impl Default for RelationalDqnConfig {
    fn default() -> Self {
        RelationalDqnConfig {
            learning_rate: 1e-2,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_end: 0.05,
            epsilon_decay_steps: 100_000,
            target_update_interval: 10,
            update_interval: 100,
            batch_size: 1024,
            replay_capacity: 1_000_000,
            // One full batch of 30-step episodes.
            min_replay_size: 1024 * 30,
            num_units: 128,
            heads: 8,
            head_dim: 16,
            relation_dim: 64,
        }
    }
}

/// DQN over a shared relational network for one role group: online and
/// target networks, replay buffer and Adam optimizer.
///
/// The network head is rectified, so its outputs are regressed onto the
/// discounted cost (negated reward) of each action and the greedy action is
/// the one with the lowest output. Spread rewards are never positive.
///
/// Learning is decentralized: `update` never reads its peers. A
/// centralized-critic (MADDPG-style) trainer would use them.
pub struct RelationalDqnTrainer {
    name: String,
    group: Range<usize>,
    observation_dim: usize,
    window: usize,
    network_config: RelationalPolicyNetworkConfig,
    online: RelationalPolicyNetwork<TrainBackend>,
    target: RelationalPolicyNetwork<InferBackend>,
    optimizer: burn::optim::adaptor::OptimizerAdaptor<
        burn::optim::Adam,
        RelationalPolicyNetwork<TrainBackend>,
        TrainBackend,
    >,
    replay_buffer: ReplayBuffer,
    config: RelationalDqnConfig,
    device: <TrainBackend as Backend>::Device,
    epsilon: f32,
    env_steps: usize,
    update_count: usize,
    rng: StdRng,
}

impl RelationalDqnTrainer {
    pub fn new(
        name: impl Into<String>,
        group: Range<usize>,
        scenario: &ScenarioConfig,
        config: RelationalDqnConfig,
    ) -> Self {
        let device = Default::default();
        let observation_dim = scenario.observation_dim();
        let window = scenario.attention_window();
        let network_config =
            RelationalPolicyNetworkConfig::new(group.len(), observation_dim, window, NUM_ACTIONS)
                .with_num_units(config.num_units)
                .with_heads(config.heads)
                .with_head_dim(config.head_dim)
                .with_relation_dim(config.relation_dim);
        let online: RelationalPolicyNetwork<TrainBackend> = network_config.init(&device);
        let target = online.valid();

        let (rng, replay_buffer) = match scenario.seed {
            Some(seed) => {
                let seed = seed.wrapping_add(group.start as u64);
                (
                    StdRng::seed_from_u64(seed),
                    ReplayBuffer::with_seed(config.replay_capacity, seed),
                )
            }
            None => (StdRng::from_os_rng(), ReplayBuffer::new(config.replay_capacity)),
        };

        RelationalDqnTrainer {
            name: name.into(),
            group,
            observation_dim,
            window,
            network_config,
            online,
            target,
            optimizer: AdamConfig::new().init(),
            replay_buffer,
            epsilon: config.epsilon_start,
            config,
            device,
            env_steps: 0,
            update_count: 0,
            rng,
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Set epsilon directly (e.g. 0.0 for pure greedy inference).
    pub fn set_epsilon(&mut self, eps: f32) {
        self.epsilon = eps;
    }

    pub fn replay_len(&self) -> usize {
        self.replay_buffer.len()
    }

    /// Online network outputs (per-action costs), one row per agent of the
    /// group.
    pub fn action_values(&self, inputs: &RoleInputs<'_>) -> Result<Vec<Vec<f32>>, ShapeError> {
        let network = self.online.valid();
        let observations =
            encode_observations::<InferBackend>(inputs.observations, self.observation_dim, &self.device)?;
        let adjacency =
            encode_adjacency::<InferBackend>(inputs.adjacency, &self.group, self.window, &self.device)?;
        let context = context_vector::<InferBackend>(self.window, &self.device);

        let values: Vec<f32> = network
            .forward_stacked(observations, adjacency, context)?
            .into_data()
            .iter::<f32>()
            .collect();
        Ok(values.chunks(NUM_ACTIONS).map(<[f32]>::to_vec).collect())
    }

    fn pick_action(&mut self, values: &[f32]) -> usize {
        if self.rng.random_range(0.0..1.0) < self.epsilon {
            return self.rng.random_range(0..NUM_ACTIONS);
        }
        greedy_action(values)
    }

    /// One gradient step on a replay batch. Returns the TD loss and the mean
    /// taken-action cost.
    fn train_step(&mut self) -> Result<UpdateMetrics, ShapeError> {
        let n = self.group.len();
        let batch = self.replay_buffer.sample(self.config.batch_size);
        let batch_size = batch.len();

        let observations: Vec<&[Vec<f32>]> =
            batch.iter().map(|t| t.observations.as_slice()).collect();
        let adjacency: Vec<_> = batch.iter().map(|t| t.adjacency.as_slice()).collect();
        let next_observations: Vec<&[Vec<f32>]> =
            batch.iter().map(|t| t.next_observations.as_slice()).collect();
        let next_adjacency: Vec<_> = batch.iter().map(|t| t.next_adjacency.as_slice()).collect();

        let mut action_mask = vec![0.0f32; batch_size * n * NUM_ACTIONS];
        let mut rewards = Vec::with_capacity(batch_size * n);
        let mut not_done = Vec::with_capacity(batch_size * n);
        for (b, transition) in batch.iter().enumerate() {
            if transition.actions.len() != n {
                return Err(ShapeError::AgentCount {
                    expected: n,
                    actual: transition.actions.len(),
                });
            }
            for (i, &action) in transition.actions.iter().enumerate() {
                action_mask[(b * n + i) * NUM_ACTIONS + action] = 1.0;
            }
            rewards.extend_from_slice(&transition.rewards);
            not_done.extend(transition.dones.iter().map(|&d| if d { 0.0 } else { 1.0 }));
        }
        if rewards.len() != batch_size * n || not_done.len() != batch_size * n {
            return Err(ShapeError::TensorDims {
                name: "rewards",
                expected: vec![batch_size, n],
                actual: vec![batch_size, rewards.len() / batch_size.max(1)],
            });
        }

        // Targets from the target network, no gradient.
        let next_values: Vec<f32> = self
            .target
            .forward_stacked(
                encode_observations_batch::<InferBackend>(
                    &next_observations,
                    self.observation_dim,
                    &self.device,
                )?,
                encode_adjacency_batch::<InferBackend>(
                    &next_adjacency,
                    &self.group,
                    self.window,
                    &self.device,
                )?,
                context_vector::<InferBackend>(self.window, &self.device),
            )?
            .into_data()
            .iter::<f32>()
            .collect();
        let targets: Vec<f32> = next_values
            .chunks(NUM_ACTIONS)
            .zip(rewards.iter().zip(&not_done))
            .map(|(row, (&reward, &live))| {
                let best = row.iter().copied().fold(f32::INFINITY, f32::min);
                -reward + self.config.gamma * live * best
            })
            .collect();
        let target_estimate = targets.iter().sum::<f32>() / targets.len() as f32;

        let values = self.online.forward_stacked(
            encode_observations_batch::<TrainBackend>(
                &observations,
                self.observation_dim,
                &self.device,
            )?,
            encode_adjacency_batch::<TrainBackend>(&adjacency, &self.group, self.window, &self.device)?,
            context_vector::<TrainBackend>(self.window, &self.device),
        )?;

        let mask = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(action_mask.as_slice()),
            &self.device,
        )
        .reshape([batch_size, n, NUM_ACTIONS]);
        let taken = (values * mask).sum_dim(2);
        let targets = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(targets.as_slice()),
            &self.device,
        )
        .reshape([batch_size, n, 1]);

        let value_estimate: f32 = taken.clone().mean().into_scalar().elem();
        let diff = taken - targets;
        let loss = (diff.clone() * diff).mean();
        let loss_val: f32 = loss.clone().into_scalar().elem();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.online);
        self.online = self
            .optimizer
            .step(self.config.learning_rate, self.online.clone(), grads);

        self.update_count += 1;
        if self.update_count % self.config.target_update_interval.max(1) == 0 {
            self.target = self.online.valid();
        }

        Ok(UpdateMetrics {
            loss: loss_val,
            value_estimate,
            target_estimate,
        })
    }

    /// Linear decay over the configured number of environment steps.
    fn decay_epsilon(&mut self) {
        if self.config.epsilon_decay_steps == 0 {
            self.epsilon = self.config.epsilon_end;
            return;
        }
        let progress = (self.env_steps as f32 / self.config.epsilon_decay_steps as f32).min(1.0);
        self.epsilon = self.config.epsilon_start
            + (self.config.epsilon_end - self.config.epsilon_start) * progress;
    }

    /// Export current training state for checkpointing.
    pub fn training_state(&self) -> RelationalDqnTrainingState {
        RelationalDqnTrainingState {
            epsilon: self.epsilon,
            env_steps: self.env_steps,
            update_count: self.update_count,
            learning_rate: self.config.learning_rate,
            gamma: self.config.gamma,
            epsilon_start: self.config.epsilon_start,
            epsilon_end: self.config.epsilon_end,
            epsilon_decay_steps: self.config.epsilon_decay_steps,
            target_update_interval: self.config.target_update_interval,
            update_interval: self.config.update_interval,
            batch_size: self.config.batch_size,
            replay_capacity: self.config.replay_capacity,
            min_replay_size: self.config.min_replay_size,
        }
    }

    /// Restore training state from a checkpoint. Network sizes stay as
    /// constructed; they are fixed by the saved weights.
    pub fn restore_training_state(&mut self, state: &RelationalDqnTrainingState) {
        self.epsilon = state.epsilon;
        self.env_steps = state.env_steps;
        self.update_count = state.update_count;
        self.config = RelationalDqnConfig {
            learning_rate: state.learning_rate,
            gamma: state.gamma,
            epsilon_start: state.epsilon_start,
            epsilon_end: state.epsilon_end,
            epsilon_decay_steps: state.epsilon_decay_steps,
            target_update_interval: state.target_update_interval,
            update_interval: state.update_interval,
            batch_size: state.batch_size,
            replay_capacity: state.replay_capacity,
            min_replay_size: state.min_replay_size,
            ..self.config.clone()
        };
    }
}

impl RoleTrainer for RelationalDqnTrainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn algorithm_name(&self) -> &str {
        ALGORITHM
    }

    fn group(&self) -> Range<usize> {
        self.group.clone()
    }

    fn action(&mut self, inputs: &RoleInputs<'_>) -> Result<Vec<usize>, ShapeError> {
        let values = self.action_values(inputs)?;
        Ok(values.iter().map(|row| self.pick_action(row)).collect())
    }

    fn experience(&mut self, transition: Transition) {
        self.replay_buffer.push(transition);
    }

    fn pre_update(&mut self) {
        self.env_steps += 1;
        self.decay_epsilon();
    }

    fn update(
        &mut self,
        _peers: &[&dyn RoleTrainer],
        step: usize,
    ) -> Result<Option<UpdateMetrics>, ShapeError> {
        let threshold = self.config.min_replay_size.max(self.config.batch_size);
        if self.replay_buffer.len() < threshold {
            return Ok(None);
        }
        if step % self.config.update_interval.max(1) != 0 {
            return Ok(None);
        }

        let metrics = self.train_step()?;
        debug!(
            trainer = %self.name,
            update = self.update_count,
            loss = metrics.loss,
            q = metrics.value_estimate,
            "relational dqn update"
        );
        Ok(Some(metrics))
    }

    fn update_count(&self) -> usize {
        self.update_count
    }

    fn exploration_rate(&self) -> f32 {
        self.epsilon
    }

    fn enter_eval_mode(&mut self) -> EvalState {
        let saved = self.epsilon;
        self.epsilon = 0.0;
        EvalState::Epsilon(saved)
    }

    fn exit_eval_mode(&mut self, state: EvalState) {
        if let EvalState::Epsilon(eps) = state {
            self.epsilon = eps;
        }
    }

    fn save_weights_to_dir(&self, dir: &Path) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();
        self.online
            .valid()
            .save_file(dir.join(NETWORK_FILE), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;
        self.target
            .clone()
            .save_file(dir.join(TARGET_FILE), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;
        Ok(())
    }

    fn load_weights_from_dir(&mut self, dir: &Path) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();

        let online: RelationalPolicyNetwork<TrainBackend> = self
            .network_config
            .init(&self.device)
            .load_file(dir.join(NETWORK_FILE), &recorder, &self.device)
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
        let target: RelationalPolicyNetwork<InferBackend> = self
            .network_config
            .init(&self.device)
            .load_file(dir.join(TARGET_FILE), &recorder, &self.device)
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;

        self.online = online;
        self.target = target;
        self.optimizer = AdamConfig::new().init();
        Ok(())
    }

    fn training_state_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string_pretty(&self.training_state())?)
    }

    fn restore_training_state_json(&mut self, json: &str) -> Result<(), CheckpointError> {
        let state: RelationalDqnTrainingState = serde_json::from_str(json)?;
        self.restore_training_state(&state);
        Ok(())
    }
}

/// Index of the lowest-cost action; ties keep the first.
fn greedy_action(costs: &[f32]) -> usize {
    costs
        .iter()
        .enumerate()
        .fold((0, f32::INFINITY), |best, (action, &cost)| {
            if cost < best.1 {
                (action, cost)
            } else {
                best
            }
        })
        .0
}

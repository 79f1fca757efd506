use std::ops::Range;
use std::path::Path;

use crate::error::{CheckpointError, ShapeError};
use crate::world::AdjacencyContext;

/// What one role group sees at a single step. Observations are in group
/// order; adjacency keeps world-wide agent indices.
#[derive(Debug, Clone, Copy)]
pub struct RoleInputs<'a> {
    pub observations: &'a [Vec<f32>],
    pub adjacency: &'a [AdjacencyContext],
}

/// One joint step of experience for a role group.
#[derive(Debug, Clone)]
pub struct Transition {
    pub observations: Vec<Vec<f32>>,
    pub adjacency: Vec<AdjacencyContext>,
    pub actions: Vec<usize>,
    pub rewards: Vec<f32>,
    pub next_observations: Vec<Vec<f32>>,
    pub next_adjacency: Vec<AdjacencyContext>,
    pub dones: Vec<bool>,
    /// Episode cut by the length limit rather than by the environment.
    pub terminal: bool,
}

/// Metrics returned from a training update.
#[derive(Debug, Clone, Default)]
pub struct UpdateMetrics {
    pub loss: f32,
    pub value_estimate: f32,
    pub target_estimate: f32,
}

/// Opaque eval state for enter/exit eval mode.
pub enum EvalState {
    Epsilon(f32),
    NoOp,
}

/// Learning rule for one role group. The training loop owns one trainer per
/// group and drives it through act / store / update.
pub trait RoleTrainer {
    /// Group name, also the checkpoint subdirectory.
    fn name(&self) -> &str;

    /// Algorithm label recorded in checkpoint metadata ("relational-dqn").
    fn algorithm_name(&self) -> &str;

    /// Agent indices this trainer acts for.
    fn group(&self) -> Range<usize>;

    /// One discrete action per agent of the group.
    fn action(&mut self, inputs: &RoleInputs<'_>) -> Result<Vec<usize>, ShapeError>;

    /// Store one step of experience.
    fn experience(&mut self, transition: Transition);

    /// Called once per environment step before any trainer updates.
    fn pre_update(&mut self) {}

    /// Possibly run a learning step. `peers` are the other groups' trainers.
    fn update(
        &mut self,
        peers: &[&dyn RoleTrainer],
        step: usize,
    ) -> Result<Option<UpdateMetrics>, ShapeError>;

    /// Number of learning steps taken so far.
    fn update_count(&self) -> usize;

    /// Current exploration rate, for progress logs.
    fn exploration_rate(&self) -> f32 {
        0.0
    }

    /// Switch to greedy behaviour. Returns state to restore.
    fn enter_eval_mode(&mut self) -> EvalState {
        EvalState::NoOp
    }

    fn exit_eval_mode(&mut self, _state: EvalState) {}

    fn save_weights_to_dir(&self, dir: &Path) -> Result<(), CheckpointError>;

    fn load_weights_from_dir(&mut self, dir: &Path) -> Result<(), CheckpointError>;

    fn training_state_json(&self) -> Result<String, CheckpointError>;

    fn restore_training_state_json(&mut self, json: &str) -> Result<(), CheckpointError>;
}

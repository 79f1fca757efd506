use serde::{Deserialize, Serialize};

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Mean summed-over-agents episode reward over the last log window.
    pub mean_episode_reward: f32,
    /// Per-agent mean episode reward over the same window.
    #[serde(default)]
    pub agent_rewards: Vec<f32>,
    pub current_loss: f32,
    pub training_steps: usize,
}

/// One role trainer stored in a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerEntry {
    /// Subdirectory holding the trainer's weights and state.
    pub name: String,
    pub algorithm: String,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub trainers: Vec<TrainerEntry>,
    pub metrics: CheckpointMetrics,
}

/// Relational DQN training state written to training_state.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationalDqnTrainingState {
    pub epsilon: f32,
    pub env_steps: usize,
    pub update_count: usize,
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_end: f32,
    pub epsilon_decay_steps: usize,
    pub target_update_interval: usize,
    pub update_interval: usize,
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub min_replay_size: usize,
}

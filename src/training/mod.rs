//! Training infrastructure: the episode loop over role groups, the replay
//! buffer, and rolling metrics for the progress log.

pub mod metrics;
pub mod replay_buffer;
pub mod trainer;

pub use trainer::{
    build_trainers, BenchmarkReport, RoleGroup, Trainer, TrainerConfig, TrainingReport,
};

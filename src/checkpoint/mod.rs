mod manager;
mod metadata;

pub use manager::{CheckpointData, CheckpointManager, CheckpointManagerConfig};
pub use metadata::{
    CheckpointMetadata, CheckpointMetrics, RelationalDqnTrainingState, TrainerEntry,
};

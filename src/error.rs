use std::path::PathBuf;

/// Shape or arity mismatches between what a network was built for and what
/// the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected {expected} agents, got {actual}")]
    AgentCount { expected: usize, actual: usize },

    #[error("observation for agent {agent} has length {actual}, expected {expected}")]
    ObservationLength {
        agent: usize,
        expected: usize,
        actual: usize,
    },

    #[error("adjacency for agent {agent} has window {actual}, expected {expected}")]
    AdjacencyWindow {
        agent: usize,
        expected: usize,
        actual: usize,
    },

    #[error("tensor {name} has dims {actual:?}, expected {expected:?}")]
    TensorDims {
        name: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("batch is empty")]
    EmptyBatch,
}

/// Errors raised by the spatial world and its environment wrapper.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("placement infeasible: landmark {landmark} not placed after {attempts} attempts")]
    PlacementInfeasible { landmark: usize, attempts: usize },

    #[error("expected {expected} actions, got {actual}")]
    ActionCount { expected: usize, actual: usize },

    #[error("agent {agent} selected invalid action {action} (action space has {num_actions})")]
    InvalidAction {
        agent: usize,
        action: usize,
        num_actions: usize,
    },
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("checkpoint holds {found} trainers, expected {expected}")]
    TrainerCount { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("world error: {0}")]
    World(#[from] WorldError),

    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("role groups cover {covered} agents, scenario has {agents}")]
    RoleCoverage { covered: usize, agents: usize },

    #[error("role '{0}' is assigned to more than one group")]
    RoleOverlap(&'static str),

    #[error("trainer {index} acts for agents {actual:?}, its role group is {expected:?}")]
    GroupMismatch {
        index: usize,
        expected: std::ops::Range<usize>,
        actual: std::ops::Range<usize>,
    },

    #[error("expected {expected} trainers (one per role group), got {actual}")]
    TrainerCount { expected: usize, actual: usize },

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

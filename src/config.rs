use std::path::Path;

use tracing::warn;

use crate::ai::RelationalDqnConfig;
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::ConfigError;
use crate::training::{RoleGroup, TrainerConfig};
use crate::world::{ScenarioConfig, SENTINEL_NORM};

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scenario: ScenarioConfig,
    pub dqn: RelationalDqnConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scenario;
        if s.num_agents == 0 {
            return Err(invalid("scenario.num_agents must be >= 1"));
        }
        if !(s.observing_range > 0.0 && s.observing_range <= SENTINEL_NORM) {
            return Err(invalid(format!(
                "scenario.observing_range must be in (0, {SENTINEL_NORM}]"
            )));
        }
        if s.min_separation < 0.0 {
            return Err(invalid("scenario.min_separation must be >= 0"));
        }
        if s.neighbor_cap == 0 {
            return Err(invalid("scenario.neighbor_cap must be >= 1"));
        }
        if s.agent_size <= 0.0 || s.landmark_size <= 0.0 {
            return Err(invalid("scenario entity sizes must be > 0"));
        }
        if s.max_placement_attempts == 0 {
            return Err(invalid("scenario.max_placement_attempts must be >= 1"));
        }
        RoleGroup::from_specs(&s.roles, s.num_agents)
            .map_err(|e| invalid(format!("scenario.roles: {e}")))?;

        let d = &self.dqn;
        if d.learning_rate <= 0.0 {
            return Err(invalid("dqn.learning_rate must be > 0"));
        }
        if !(0.0..=1.0).contains(&d.gamma) {
            return Err(invalid("dqn.gamma must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&d.epsilon_start) {
            return Err(invalid("dqn.epsilon_start must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&d.epsilon_end) {
            return Err(invalid("dqn.epsilon_end must be in [0, 1]"));
        }
        if d.epsilon_end > d.epsilon_start {
            return Err(invalid("dqn.epsilon_end must be <= dqn.epsilon_start"));
        }
        if d.batch_size == 0 {
            return Err(invalid("dqn.batch_size must be > 0"));
        }
        if d.replay_capacity < d.batch_size {
            return Err(invalid("dqn.replay_capacity must be >= dqn.batch_size"));
        }
        if d.min_replay_size < d.batch_size {
            return Err(invalid("dqn.min_replay_size must be >= dqn.batch_size"));
        }
        if d.update_interval == 0 || d.target_update_interval == 0 {
            return Err(invalid("dqn update intervals must be > 0"));
        }
        if d.num_units == 0 || d.heads == 0 || d.head_dim == 0 || d.relation_dim == 0 {
            return Err(invalid("dqn network widths must be > 0"));
        }

        let t = &self.training;
        if t.num_episodes == 0 {
            return Err(invalid("training.num_episodes must be > 0"));
        }
        if t.max_episode_len == 0 {
            return Err(invalid("training.max_episode_len must be > 0"));
        }
        if t.save_rate == 0 {
            return Err(invalid("training.save_rate must be > 0"));
        }

        Ok(())
    }

    /// Render every field with its default value, for writing a starter
    /// config file.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

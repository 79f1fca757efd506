/// Discrete actions: no-op, +x, -x, +y, -y.
pub const NUM_ACTIONS: usize = 5;

/// Norm of the (-1, -1) padding pair. An observing range no larger than this
/// keeps every real relative position distinguishable from padding.
pub const SENTINEL_NORM: f32 = std::f32::consts::SQRT_2;

/// Role a group of agents plays. Each role group gets its own trainer and
/// its own network instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Adversary,
    Cooperative,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Adversary => "adversaries",
            Role::Cooperative => "cooperative",
        }
    }
}

/// A contiguous block of `count` agents sharing one role.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoleSpec {
    pub role: Role,
    pub count: usize,
}

/// Scenario parameters for the spread world.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub num_agents: usize,
    pub num_landmarks: usize,
    pub observing_range: f32,
    /// Extra clearance required between landmark edges during placement.
    pub min_separation: f32,
    /// Visible-neighbor cap; also the attention window size.
    pub neighbor_cap: usize,
    pub dim_c: usize,
    pub agent_size: f32,
    pub landmark_size: f32,
    pub max_placement_attempts: usize,
    /// Role blocks in agent-index order. Counts must sum to `num_agents`.
    pub roles: Vec<RoleSpec>,
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            num_agents: 5,
            num_landmarks: 5,
            observing_range: 0.7,
            min_separation: 0.06,
            neighbor_cap: 3,
            dim_c: 2,
            agent_size: 0.10,
            landmark_size: 0.05,
            max_placement_attempts: 10_000,
            roles: vec![RoleSpec {
                role: Role::Adversary,
                count: 5,
            }],
            seed: None,
        }
    }
}

impl ScenarioConfig {
    /// Landmark slots in each observation.
    pub fn landmark_slots(&self) -> usize {
        self.neighbor_cap.min(self.num_landmarks)
    }

    /// Other-agent slots in each observation.
    pub fn agent_slots(&self) -> usize {
        self.neighbor_cap.min(self.num_agents.saturating_sub(1))
    }

    /// Fixed observation width: velocity, position, then both padded blocks.
    pub fn observation_dim(&self) -> usize {
        4 + 2 * self.landmark_slots() + 2 * self.agent_slots()
    }

    /// Number of adjacency slots per agent, self included.
    pub fn attention_window(&self) -> usize {
        self.neighbor_cap
    }
}

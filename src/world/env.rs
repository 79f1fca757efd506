use crate::error::WorldError;
use crate::world::observation::{AdjacencyContext, ObservationBuilder};
use crate::world::scenario::ScenarioConfig;
use crate::world::spatial::{BenchmarkData, World};

/// Everything the environment reports after one step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub observations: Vec<Vec<f32>>,
    pub rewards: Vec<f32>,
    pub dones: Vec<bool>,
    pub info: Vec<BenchmarkData>,
    pub adjacency: Vec<AdjacencyContext>,
}

/// Multi-agent environment over a single `World`.
pub struct MultiAgentEnv {
    world: World,
    builder: ObservationBuilder,
}

impl MultiAgentEnv {
    pub fn new(config: &ScenarioConfig) -> Self {
        let world = World::new(config);
        let builder = ObservationBuilder::new(&world);
        MultiAgentEnv { world, builder }
    }

    pub fn num_agents(&self) -> usize {
        self.world.num_agents()
    }

    pub fn observation_dim(&self) -> usize {
        self.builder.observation_dim()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Start a new episode.
    pub fn reset(&mut self) -> Result<(Vec<Vec<f32>>, Vec<AdjacencyContext>), WorldError> {
        self.world.reset()?;
        Ok(self.builder.observe_all(&self.world))
    }

    /// Apply one discrete action per agent and observe the result.
    pub fn step(&mut self, actions: &[usize]) -> Result<StepOutcome, WorldError> {
        self.world.apply_actions(actions)?;

        let (observations, adjacency) = self.builder.observe_all(&self.world);
        let n = self.world.num_agents();
        let rewards = (0..n).map(|i| self.world.reward(i)).collect();
        let info = (0..n).map(|i| self.world.benchmark_data(i)).collect();

        Ok(StepOutcome {
            observations,
            rewards,
            // The spread scenario never terminates on its own.
            dones: vec![false; n],
            info,
            adjacency,
        })
    }
}

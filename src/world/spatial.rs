use nalgebra as na;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::WorldError;
use crate::world::entity::{is_collision, Agent, Landmark, Point, Vector};
use crate::world::scenario::{ScenarioConfig, NUM_ACTIONS};

/// A landmark counts as occupied when its nearest agent is closer than this.
const OCCUPIED_DISTANCE: f32 = 0.1;

/// Point-mass integration constants for the discrete action space.
#[derive(Debug, Clone, Copy)]
pub struct Dynamics {
    pub damping: f32,
    pub dt: f32,
    pub mass: f32,
    /// Force magnitude produced by a single movement action.
    pub sensitivity: f32,
}

impl Default for Dynamics {
    fn default() -> Self {
        Dynamics {
            damping: 0.25,
            dt: 0.1,
            mass: 1.0,
            sensitivity: 5.0,
        }
    }
}

/// Per-agent evaluation statistics for the current world state.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkData {
    pub reward: f32,
    pub collisions: usize,
    pub min_dists: f32,
    pub occupied_landmarks: usize,
}

/// Ground truth for agents and landmarks.
///
/// The world is single-writer: every mutation goes through `&mut self`, so
/// parallel rollouts need one `World` each.
pub struct World {
    pub agents: Vec<Agent>,
    pub landmarks: Vec<Landmark>,
    pub dim_c: usize,
    pub observing_range: f32,
    pub min_separation: f32,
    pub neighbor_cap: usize,
    pub max_placement_attempts: usize,
    pub dynamics: Dynamics,
    rng: StdRng,
}

impl World {
    /// Build the world described by `config`. Entities sit at the origin
    /// until the first `reset`.
    pub fn new(config: &ScenarioConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        World {
            agents: (0..config.num_agents)
                .map(|id| Agent::new(id, config.agent_size, config.dim_c))
                .collect(),
            landmarks: (0..config.num_landmarks)
                .map(|i| Landmark::new(i, config.landmark_size))
                .collect(),
            dim_c: config.dim_c,
            observing_range: config.observing_range,
            min_separation: config.min_separation,
            neighbor_cap: config.neighbor_cap,
            max_placement_attempts: config.max_placement_attempts,
            dynamics: Dynamics::default(),
            rng,
        }
    }

    /// Randomise agent positions and re-place every landmark.
    pub fn reset(&mut self) -> Result<(), WorldError> {
        for agent in &mut self.agents {
            agent.position = Point::new(
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
            );
            agent.velocity = Vector::zeros();
            agent.comm = vec![0.0; self.dim_c];
        }
        self.place_landmarks()?;
        tracing::debug!(
            agents = self.agents.len(),
            landmarks = self.landmarks.len(),
            "world reset"
        );
        Ok(())
    }

    /// Rejection-sample landmark positions in index order. Each landmark must
    /// clear every earlier one by the sum of both radii plus the separation
    /// margin; the first is accepted as drawn.
    fn place_landmarks(&mut self) -> Result<(), WorldError> {
        for i in 0..self.landmarks.len() {
            let mut attempts = 0;
            loop {
                if attempts == self.max_placement_attempts {
                    return Err(WorldError::PlacementInfeasible {
                        landmark: i,
                        attempts,
                    });
                }
                attempts += 1;

                let candidate = Point::new(
                    self.rng.random_range(-1.0..1.0),
                    self.rng.random_range(-1.0..1.0),
                );
                let size = self.landmarks[i].size;
                let clear = self.landmarks[..i].iter().all(|placed| {
                    na::distance(&placed.position, &candidate) - (placed.size + size + self.min_separation)
                        > 0.0
                });
                if clear {
                    self.landmarks[i].position = candidate;
                    break;
                }
            }
        }
        Ok(())
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Collision predicate between two agents.
    pub fn is_collision(&self, a: usize, b: usize) -> bool {
        is_collision(&self.agents[a], &self.agents[b])
    }

    /// Advance positions one tick from discrete actions, one per agent.
    pub fn apply_actions(&mut self, actions: &[usize]) -> Result<(), WorldError> {
        if actions.len() != self.agents.len() {
            return Err(WorldError::ActionCount {
                expected: self.agents.len(),
                actual: actions.len(),
            });
        }
        if let Some((agent, &action)) = actions
            .iter()
            .enumerate()
            .find(|&(_, &a)| a >= NUM_ACTIONS)
        {
            return Err(WorldError::InvalidAction {
                agent,
                action,
                num_actions: NUM_ACTIONS,
            });
        }

        let Dynamics {
            damping,
            dt,
            mass,
            sensitivity,
        } = self.dynamics;
        for (agent, &action) in self.agents.iter_mut().zip(actions) {
            let force = action_direction(action) * sensitivity;
            agent.velocity = agent.velocity * (1.0 - damping) + force * (dt / mass);
            agent.position += agent.velocity * dt;
        }
        Ok(())
    }

    /// Distance from each landmark to its nearest agent.
    fn nearest_agent_distances(&self) -> impl Iterator<Item = f32> + '_ {
        self.landmarks.iter().map(|landmark| {
            self.agents
                .iter()
                .map(|a| na::distance(&a.position, &landmark.position))
                .fold(f32::INFINITY, f32::min)
        })
    }

    /// Other agents currently overlapping `agent`. The self-pair is never
    /// counted, so these counts (and the collision term of `reward` and
    /// `benchmark_data`) run one lower per agent than a scorer that loops
    /// over every agent including itself; adjust before comparing benchmark
    /// numbers with such runs.
    fn collision_count(&self, agent: usize) -> usize {
        if !self.agents[agent].collide {
            return 0;
        }
        (0..self.agents.len())
            .filter(|&other| other != agent && self.is_collision(agent, other))
            .count()
    }

    /// Shared coverage term minus one per collision with another agent.
    pub fn reward(&self, agent: usize) -> f32 {
        let coverage: f32 = self.nearest_agent_distances().sum();
        -coverage - self.collision_count(agent) as f32
    }

    pub fn benchmark_data(&self, agent: usize) -> BenchmarkData {
        let mut min_dists = 0.0;
        let mut occupied_landmarks = 0;
        for dist in self.nearest_agent_distances() {
            min_dists += dist;
            if dist < OCCUPIED_DISTANCE {
                occupied_landmarks += 1;
            }
        }
        let collisions = self.collision_count(agent);
        BenchmarkData {
            reward: -min_dists - collisions as f32,
            collisions,
            min_dists,
            occupied_landmarks,
        }
    }
}

fn action_direction(action: usize) -> Vector {
    match action {
        1 => Vector::x(),
        2 => -Vector::x(),
        3 => Vector::y(),
        4 => -Vector::y(),
        _ => Vector::zeros(),
    }
}

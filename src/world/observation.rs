use std::ops::Range;

use crate::world::entity::{Point, Vector};
use crate::world::spatial::World;

/// Padding value for empty landmark/agent slots.
pub const SENTINEL: f32 = -1.0;

/// Offsets of the blocks inside a fixed-width observation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationLayout {
    pub landmark_slots: usize,
    pub agent_slots: usize,
}

impl ObservationLayout {
    pub const LANDMARK_OFFSET: usize = 4;

    pub fn agent_offset(&self) -> usize {
        Self::LANDMARK_OFFSET + 2 * self.landmark_slots
    }

    pub fn width(&self) -> usize {
        self.agent_offset() + 2 * self.agent_slots
    }
}

/// The agents whose embeddings feed one agent's attention step.
///
/// Slot 0 is always the agent itself. The remaining slots hold the nearest
/// visible agents by ascending distance, and repeat the agent's own index
/// when fewer are in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyContext {
    pub agent: usize,
    pub neighbors: Vec<usize>,
}

impl AdjacencyContext {
    pub fn window(&self) -> usize {
        self.neighbors.len()
    }

    /// Row-major one-hot matrix `[window, group.len()]` selecting neighbor
    /// rows out of the group's embedding matrix. Neighbors outside the group
    /// fall back to the agent's own row; `agent` must lie inside `group`.
    pub fn selection_matrix(&self, group: &Range<usize>) -> Vec<f32> {
        debug_assert!(group.contains(&self.agent), "agent outside its group");
        let width = group.len();
        let mut matrix = vec![0.0f32; self.window() * width];
        for (slot, &neighbor) in self.neighbors.iter().enumerate() {
            let target = if group.contains(&neighbor) {
                neighbor
            } else {
                self.agent
            };
            if group.contains(&target) {
                matrix[slot * width + (target - group.start)] = 1.0;
            }
        }
        matrix
    }
}

/// Builds fixed-width observations and adjacency from the world state.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    layout: ObservationLayout,
    window: usize,
}

impl ObservationBuilder {
    pub fn new(world: &World) -> Self {
        let cap = world.neighbor_cap;
        ObservationBuilder {
            layout: ObservationLayout {
                landmark_slots: cap.min(world.landmarks.len()),
                agent_slots: cap.min(world.agents.len().saturating_sub(1)),
            },
            window: cap,
        }
    }

    pub fn layout(&self) -> ObservationLayout {
        self.layout
    }

    pub fn observation_dim(&self) -> usize {
        self.layout.width()
    }

    /// Observation vector and adjacency for one agent.
    pub fn observe(&self, world: &World, agent: usize) -> (Vec<f32>, AdjacencyContext) {
        let me = &world.agents[agent];
        let range = world.observing_range;

        let landmarks = visible_sorted(
            me.position,
            world.landmarks.iter().enumerate().map(|(i, l)| (i, l.position)),
            range,
        );
        let others = visible_sorted(
            me.position,
            world
                .agents
                .iter()
                .filter(|other| other.id != me.id)
                .map(|other| (other.id, other.position)),
            range,
        );

        let mut obs = Vec::with_capacity(self.layout.width());
        obs.extend_from_slice(&[me.velocity.x, me.velocity.y]);
        obs.extend_from_slice(&[me.position.x, me.position.y]);
        push_padded(&mut obs, &landmarks, self.layout.landmark_slots);
        push_padded(&mut obs, &others, self.layout.agent_slots);

        let mut neighbors = Vec::with_capacity(self.window);
        neighbors.push(agent);
        neighbors.extend(
            others
                .iter()
                .take(self.window.saturating_sub(1))
                .map(|v| v.index),
        );
        neighbors.resize(self.window, agent);

        (obs, AdjacencyContext { agent, neighbors })
    }

    pub fn observation(&self, world: &World, agent: usize) -> Vec<f32> {
        self.observe(world, agent).0
    }

    /// Observations and adjacency for every agent, in agent order.
    pub fn observe_all(&self, world: &World) -> (Vec<Vec<f32>>, Vec<AdjacencyContext>) {
        (0..world.num_agents())
            .map(|agent| self.observe(world, agent))
            .unzip()
    }
}

struct Visible {
    index: usize,
    relative: Vector,
    distance: f32,
}

/// Entities strictly inside `range`, nearest first. `sort_by` is stable, so
/// equal distances keep input order.
fn visible_sorted(
    origin: Point,
    entities: impl Iterator<Item = (usize, Point)>,
    range: f32,
) -> Vec<Visible> {
    let mut visible: Vec<Visible> = entities
        .map(|(index, position)| {
            let relative = position - origin;
            Visible {
                index,
                relative,
                distance: relative.norm(),
            }
        })
        .filter(|v| v.distance < range)
        .collect();
    visible.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    visible
}

fn push_padded(obs: &mut Vec<f32>, visible: &[Visible], slots: usize) {
    for v in visible.iter().take(slots) {
        obs.extend_from_slice(&[v.relative.x, v.relative.y]);
    }
    for _ in visible.len().min(slots)..slots {
        obs.extend_from_slice(&[SENTINEL, SENTINEL]);
    }
}

//! The spread world: entities, constrained landmark placement, point-mass
//! bookkeeping, bounded-visibility observations and the environment wrapper.

pub mod entity;
pub mod env;
pub mod observation;
pub mod scenario;
pub mod spatial;

pub use entity::{is_collision, Agent, Body, Landmark, Point, Vector};
pub use env::{MultiAgentEnv, StepOutcome};
pub use observation::{AdjacencyContext, ObservationBuilder, ObservationLayout, SENTINEL};
pub use scenario::{Role, RoleSpec, ScenarioConfig, NUM_ACTIONS, SENTINEL_NORM};
pub use spatial::{BenchmarkData, Dynamics, World};

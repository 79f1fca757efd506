//! Relational networks, their tensor encoding, and the trainers that learn
//! them.

mod agent;
pub mod algorithms;
pub mod networks;
pub mod state_encoding;

pub use agent::{EvalState, RoleInputs, RoleTrainer, Transition, UpdateMetrics};
pub use algorithms::{RelationalDqnConfig, RelationalDqnTrainer};
pub use networks::{RelationalPolicyNetwork, RelationalPolicyNetworkConfig};

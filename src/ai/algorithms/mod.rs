mod relational_dqn;

pub use relational_dqn::{RelationalDqnConfig, RelationalDqnTrainer};

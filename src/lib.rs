//! # ML Relational Spread
//!
//! Multi-agent reinforcement learning on the cooperative spread world: agents
//! must cover landmarks without colliding while seeing only what is inside
//! their observing range. Each role group is trained by a relational DQN
//! whose network attends over a bounded window of neighbors, built on the
//! Burn ML framework.
//!
//! ## Modules
//!
//! - [`world`]: Entities, landmark placement, dynamics, observations, environment
//! - [`ai`]: Role trainer trait, relational DQN, attention networks, tensor encoding
//! - [`training`]: Episode loop, replay buffer, metrics collection
//! - [`checkpoint`]: Per-trainer model persistence and pruning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod training;
pub mod world;

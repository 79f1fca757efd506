use burn::prelude::*;

use crate::ai::networks::action_value_head::{ActionValueHead, ActionValueHeadConfig};
use crate::ai::networks::attention::{RelationalAttention, RelationalAttentionConfig};
use crate::ai::networks::encoder::{FeatureEncoder, FeatureEncoderConfig};
use crate::error::ShapeError;

/// Relational action-value network for one role group.
///
/// One encoder, one attention block and one head are shared by all agents
/// of the group; the per-agent evaluations run as a single batch along the
/// agent axis.
/// ```text
/// Observations: [batch, n, obs_dim]  --encoder-->  E [batch, n, units]
/// Adjacency:    [batch, n, l, n] x E               =>  [batch, n, l, units]
/// Attention (shared, per agent)                    =>  [batch, n, 1, relation_dim]
/// Head(E, relation)                                =>  [batch, n, num_actions]
/// ```
#[derive(Module, Debug)]
pub struct RelationalPolicyNetwork<B: Backend> {
    encoder: FeatureEncoder<B>,
    attention: RelationalAttention<B>,
    head: ActionValueHead<B>,
    num_agents: usize,
    observation_dim: usize,
    window: usize,
    num_actions: usize,
}

#[derive(Config, Debug)]
pub struct RelationalPolicyNetworkConfig {
    pub num_agents: usize,
    pub observation_dim: usize,
    /// Neighbor slots per agent, self included.
    pub window: usize,
    pub num_actions: usize,
    #[config(default = 128)]
    pub num_units: usize,
    #[config(default = 8)]
    pub heads: usize,
    #[config(default = 16)]
    pub head_dim: usize,
    #[config(default = 64)]
    pub relation_dim: usize,
}

impl RelationalPolicyNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RelationalPolicyNetwork<B> {
        RelationalPolicyNetwork {
            encoder: FeatureEncoderConfig::new(self.observation_dim)
                .with_num_units(self.num_units)
                .init(device),
            attention: RelationalAttentionConfig::new(self.num_units)
                .with_heads(self.heads)
                .with_head_dim(self.head_dim)
                .with_output_dim(self.relation_dim)
                .init(device),
            head: ActionValueHeadConfig::new(self.num_units, self.relation_dim, self.num_actions)
                .init(device),
            num_agents: self.num_agents,
            observation_dim: self.observation_dim,
            window: self.window,
            num_actions: self.num_actions,
        }
    }
}

impl<B: Backend> RelationalPolicyNetwork<B> {
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Forward pass returning `[batch, n, num_actions]`.
    pub fn forward_stacked(
        &self,
        observations: Tensor<B, 3>,
        adjacency: Tensor<B, 4>,
        context: Tensor<B, 2>,
    ) -> Result<Tensor<B, 3>, ShapeError> {
        self.check_shapes(&observations, &adjacency, &context)?;
        let [batch, n, _] = observations.dims();
        let l = self.window;

        let features = self.encoder.forward(observations);
        let units = features.dims()[2];

        // Every agent's selection matrix picks rows out of the same
        // all-agents embedding matrix.
        let all_agents = features.clone().unsqueeze_dim::<4>(1).repeat_dim(1, n);
        let neighbors = adjacency
            .matmul(all_agents)
            .reshape([batch * n, l, units]);

        let relation =
            self.attention
                .forward(neighbors.clone(), neighbors.clone(), neighbors, context);
        let own = features.reshape([batch * n, 1, units]);

        Ok(self
            .head
            .forward(own, relation)
            .reshape([batch, n, self.num_actions]))
    }

    /// Forward pass returning one `[batch, num_actions]` tensor per agent, in
    /// agent order.
    pub fn forward(
        &self,
        observations: Tensor<B, 3>,
        adjacency: Tensor<B, 4>,
        context: Tensor<B, 2>,
    ) -> Result<Vec<Tensor<B, 2>>, ShapeError> {
        let stacked = self.forward_stacked(observations, adjacency, context)?;
        let [batch, n, actions] = stacked.dims();
        Ok((0..n)
            .map(|agent| {
                stacked
                    .clone()
                    .slice([0..batch, agent..agent + 1, 0..actions])
                    .squeeze::<2>(1)
            })
            .collect())
    }

    fn check_shapes(
        &self,
        observations: &Tensor<B, 3>,
        adjacency: &Tensor<B, 4>,
        context: &Tensor<B, 2>,
    ) -> Result<(), ShapeError> {
        let [batch, n, obs_dim] = observations.dims();
        if batch == 0 {
            return Err(ShapeError::EmptyBatch);
        }
        if n != self.num_agents {
            return Err(ShapeError::AgentCount {
                expected: self.num_agents,
                actual: n,
            });
        }
        if obs_dim != self.observation_dim {
            return Err(ShapeError::TensorDims {
                name: "observations",
                expected: vec![batch, self.num_agents, self.observation_dim],
                actual: observations.dims().to_vec(),
            });
        }
        let expected_adjacency = [batch, self.num_agents, self.window, self.num_agents];
        if adjacency.dims() != expected_adjacency {
            return Err(ShapeError::TensorDims {
                name: "adjacency",
                expected: expected_adjacency.to_vec(),
                actual: adjacency.dims().to_vec(),
            });
        }
        if context.dims() != [1, self.window] {
            return Err(ShapeError::TensorDims {
                name: "context",
                expected: vec![1, self.window],
                actual: context.dims().to_vec(),
            });
        }
        Ok(())
    }
}

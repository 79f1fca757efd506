use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Maps (own embedding, relational embedding) to per-action values.
///
/// ```text
/// Concat: [m, 1, feature_dim] ++ [m, 1, relation_dim]  =>  [m, 1, feature_dim + relation_dim]
/// Squeeze the neighbor axis                            =>  [m, feature_dim + relation_dim]
/// FC:     -> num_actions, ReLU
/// ```
#[derive(Module, Debug)]
pub struct ActionValueHead<B: Backend> {
    fc: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct ActionValueHeadConfig {
    pub feature_dim: usize,
    pub relation_dim: usize,
    pub num_actions: usize,
}

impl ActionValueHeadConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ActionValueHead<B> {
        ActionValueHead {
            fc: LinearConfig::new(self.feature_dim + self.relation_dim, self.num_actions)
                .init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> ActionValueHead<B> {
    pub fn forward(&self, feature: Tensor<B, 3>, relation: Tensor<B, 3>) -> Tensor<B, 2> {
        let h = Tensor::cat(vec![feature, relation], 2).squeeze::<2>(1);
        self.relu.forward(self.fc.forward(h))
    }
}

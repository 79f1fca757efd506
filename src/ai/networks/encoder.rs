use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Observation encoder shared by every agent of a role group.
///
/// ```text
/// Input:  [..., input_dim]
/// FC1:    input_dim -> num_units, ReLU
/// FC2:    num_units -> num_units, ReLU
/// FC3:    num_units -> num_units
/// ```
#[derive(Module, Debug)]
pub struct FeatureEncoder<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct FeatureEncoderConfig {
    pub input_dim: usize,
    #[config(default = 128)]
    pub num_units: usize,
}

impl FeatureEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FeatureEncoder<B> {
        FeatureEncoder {
            fc1: LinearConfig::new(self.input_dim, self.num_units).init(device),
            fc2: LinearConfig::new(self.num_units, self.num_units).init(device),
            fc3: LinearConfig::new(self.num_units, self.num_units).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> FeatureEncoder<B> {
    /// Encode along the last axis; leading axes are carried through, so a
    /// whole `[batch, agents, input_dim]` block is encoded in one pass.
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, D> {
        let x = self.relu.forward(self.fc1.forward(input));
        let x = self.relu.forward(self.fc2.forward(x));
        self.fc3.forward(x)
    }

    /// One agent's observations `[batch, input_dim]` -> `[batch, 1, num_units]`.
    pub fn encode_agent(&self, observation: Tensor<B, 2>) -> Tensor<B, 3> {
        self.forward(observation).unsqueeze_dim(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_encode_agent_adds_neighbor_axis() {
        let device = Default::default();
        let encoder = FeatureEncoderConfig::new(16)
            .with_num_units(32)
            .init::<TestBackend>(&device);

        let obs = Tensor::zeros([4, 16], &device);
        let out = encoder.encode_agent(obs);
        assert_eq!(out.shape().dims, [4, 1, 32]);
    }

    #[test]
    fn test_batched_matches_per_agent() {
        let device = Default::default();
        let encoder = FeatureEncoderConfig::new(6)
            .with_num_units(8)
            .init::<TestBackend>(&device);

        let all = Tensor::<TestBackend, 3>::random(
            [2, 3, 6],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let batched = encoder.forward(all.clone());
        for agent in 0..3 {
            let single = all.clone().slice([0..2, agent..agent + 1, 0..6]).squeeze::<2>(1);
            let expected = encoder.encode_agent(single).squeeze::<2>(1);
            let got = batched
                .clone()
                .slice([0..2, agent..agent + 1, 0..8])
                .squeeze::<2>(1);
            let got: Vec<f32> = got.into_data().to_vec().unwrap();
            let expected: Vec<f32> = expected.into_data().to_vec().unwrap();
            for (g, e) in got.iter().zip(&expected) {
                assert!((g - e).abs() < 1e-5, "agent {agent}: {g} vs {e}");
            }
        }
    }
}

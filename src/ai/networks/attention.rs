use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Multi-head scaled dot-product attention over an agent's neighbor window,
/// folded into a single relational embedding by a context row vector.
///
/// ```text
/// Sources:  [m, l, input_dim]            (value, query, key)
/// Project:  input_dim -> heads*head_dim, ReLU   (one Linear each)
/// Split:    [m, heads, l, head_dim]
/// Logits:   q . k^T / sqrt(head_dim)  =>  [m, heads, l, l]
/// Softmax over the neighbor axis, weighted sum of values
/// Merge:    [m, l, heads*head_dim]
/// Fold:     context [1, l] x merged   =>  [m, 1, heads*head_dim]
/// Output:   heads*head_dim -> output_dim, ReLU  =>  [m, 1, output_dim]
/// ```
#[derive(Module, Debug)]
pub struct RelationalAttention<B: Backend> {
    value: Linear<B>,
    query: Linear<B>,
    key: Linear<B>,
    output: Linear<B>,
    relu: Relu,
    heads: usize,
    head_dim: usize,
}

#[derive(Config, Debug)]
pub struct RelationalAttentionConfig {
    pub input_dim: usize,
    #[config(default = 8)]
    pub heads: usize,
    #[config(default = 16)]
    pub head_dim: usize,
    #[config(default = 64)]
    pub output_dim: usize,
}

impl RelationalAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RelationalAttention<B> {
        let projected = self.heads * self.head_dim;
        RelationalAttention {
            value: LinearConfig::new(self.input_dim, projected).init(device),
            query: LinearConfig::new(self.input_dim, projected).init(device),
            key: LinearConfig::new(self.input_dim, projected).init(device),
            output: LinearConfig::new(projected, self.output_dim).init(device),
            relu: Relu::new(),
            heads: self.heads,
            head_dim: self.head_dim,
        }
    }
}

impl<B: Backend> RelationalAttention<B> {
    /// `values`, `queries`, `keys` are `[m, l, input_dim]`; `context` is
    /// `[1, l]`. Returns `[m, 1, output_dim]`.
    pub fn forward(
        &self,
        values: Tensor<B, 3>,
        queries: Tensor<B, 3>,
        keys: Tensor<B, 3>,
        context: Tensor<B, 2>,
    ) -> Tensor<B, 3> {
        let [m, l, _] = values.dims();

        let v = self.split_heads(self.relu.forward(self.value.forward(values)), m, l);
        let q = self.split_heads(self.relu.forward(self.query.forward(queries)), m, l);
        let k = self.split_heads(self.relu.forward(self.key.forward(keys)), m, l);

        let logits = q
            .matmul(k.swap_dims(2, 3))
            .div_scalar((self.head_dim as f32).sqrt());
        let weights = stable_softmax(logits, 3);

        let merged = weights
            .matmul(v)
            .swap_dims(1, 2)
            .reshape([m, l, self.heads * self.head_dim]);

        let folded = context.reshape([1, 1, l]).repeat_dim(0, m).matmul(merged);
        self.relu.forward(self.output.forward(folded))
    }

    /// `[m, l, heads*head_dim]` -> `[m, heads, l, head_dim]`.
    fn split_heads(&self, x: Tensor<B, 3>, m: usize, l: usize) -> Tensor<B, 4> {
        x.reshape([m, l, self.heads, self.head_dim]).swap_dims(1, 2)
    }
}

/// Softmax along `dim` with the maximum subtracted first, so large logits
/// cannot overflow `exp`.
pub fn stable_softmax<B: Backend, const D: usize>(logits: Tensor<B, D>, dim: usize) -> Tensor<B, D> {
    let max = logits.clone().detach().max_dim(dim);
    let exp = (logits - max).exp();
    exp.clone() / exp.sum_dim(dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::{Distribution, TensorData};

    type TestBackend = NdArray<f32>;

    fn self_context(l: usize, device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 2> {
        let mut data = vec![0.0f32; l];
        data[0] = 1.0;
        Tensor::<TestBackend, 1>::from_data(TensorData::from(data.as_slice()), device).reshape([1, l])
    }

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let attention = RelationalAttentionConfig::new(32).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([5, 3, 32], Distribution::Default, &device);
        let out = attention.forward(x.clone(), x.clone(), x, self_context(3, &device));
        assert_eq!(out.shape().dims, [5, 1, 64]);
    }

    #[test]
    fn test_custom_heads_and_width() {
        let device = Default::default();
        let attention = RelationalAttentionConfig::new(12)
            .with_heads(2)
            .with_head_dim(4)
            .with_output_dim(10)
            .init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([2, 4, 12], Distribution::Default, &device);
        let out = attention.forward(x.clone(), x.clone(), x, self_context(4, &device));
        assert_eq!(out.shape().dims, [2, 1, 10]);
    }

    #[test]
    fn test_deterministic_for_fixed_weights_and_inputs() {
        let device = Default::default();
        let attention = RelationalAttentionConfig::new(16).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([3, 3, 16], Distribution::Default, &device);
        let ctx = self_context(3, &device);

        let a: Vec<f32> = attention
            .forward(x.clone(), x.clone(), x.clone(), ctx.clone())
            .into_data()
            .to_vec()
            .unwrap();
        let b: Vec<f32> = attention
            .forward(x.clone(), x.clone(), x, ctx)
            .into_data()
            .to_vec()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_outputs_are_non_negative() {
        let device = Default::default();
        let attention = RelationalAttentionConfig::new(8).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([4, 2, 8], Distribution::Uniform(-5.0, 5.0), &device);
        let out: Vec<f32> = attention
            .forward(x.clone(), x.clone(), x, self_context(2, &device))
            .into_data()
            .to_vec()
            .unwrap();
        assert!(out.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_stable_softmax_handles_extreme_logits() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 1>::from_data(
            TensorData::from([1.0e4f32, 1.0e4 - 1.0, -1.0e4].as_slice()),
            &device,
        )
        .reshape([1, 3]);
        let probs: Vec<f32> = stable_softmax(logits, 1).into_data().to_vec().unwrap();

        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        let e = std::f32::consts::E;
        assert!((probs[0] - e / (e + 1.0)).abs() < 1e-4);
        assert!(probs[2] < 1e-6);
    }

    #[test]
    fn test_stable_softmax_rows_sum_to_one() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 3>::random([2, 4, 5], Distribution::Uniform(-3.0, 3.0), &device);
        let sums: Vec<f32> = stable_softmax(logits, 2).sum_dim(2).into_data().to_vec().unwrap();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }
}

use std::ops::Range;

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::error::ShapeError;
use crate::world::AdjacencyContext;

/// Encode one joint observation as `[1, agents, observation_dim]`.
pub fn encode_observations<B: Backend>(
    observations: &[Vec<f32>],
    observation_dim: usize,
    device: &B::Device,
) -> Result<Tensor<B, 3>, ShapeError> {
    encode_observations_batch(&[observations], observation_dim, device)
}

/// Encode a batch of joint observations as `[batch, agents, observation_dim]`.
///
/// Every sample must hold the same number of agents and every observation
/// must be exactly `observation_dim` wide.
pub fn encode_observations_batch<B: Backend>(
    samples: &[&[Vec<f32>]],
    observation_dim: usize,
    device: &B::Device,
) -> Result<Tensor<B, 3>, ShapeError> {
    let first = samples.first().ok_or(ShapeError::EmptyBatch)?;
    let agents = first.len();

    let mut flat = Vec::with_capacity(samples.len() * agents * observation_dim);
    for sample in samples {
        if sample.len() != agents {
            return Err(ShapeError::AgentCount {
                expected: agents,
                actual: sample.len(),
            });
        }
        for (agent, obs) in sample.iter().enumerate() {
            if obs.len() != observation_dim {
                return Err(ShapeError::ObservationLength {
                    agent,
                    expected: observation_dim,
                    actual: obs.len(),
                });
            }
            flat.extend_from_slice(obs);
        }
    }

    Ok(Tensor::<B, 1>::from_data(TensorData::from(flat.as_slice()), device)
        .reshape([samples.len(), agents, observation_dim]))
}

/// Encode one group's adjacency as `[1, agents, window, agents]`.
pub fn encode_adjacency<B: Backend>(
    adjacency: &[AdjacencyContext],
    group: &Range<usize>,
    window: usize,
    device: &B::Device,
) -> Result<Tensor<B, 4>, ShapeError> {
    encode_adjacency_batch(&[adjacency], group, window, device)
}

/// Encode a batch of group adjacency as `[batch, agents, window, agents]`
/// one-hot selection matrices, with columns indexed relative to `group`.
pub fn encode_adjacency_batch<B: Backend>(
    samples: &[&[AdjacencyContext]],
    group: &Range<usize>,
    window: usize,
    device: &B::Device,
) -> Result<Tensor<B, 4>, ShapeError> {
    if samples.is_empty() {
        return Err(ShapeError::EmptyBatch);
    }
    let agents = group.len();

    let mut flat = Vec::with_capacity(samples.len() * agents * window * agents);
    for sample in samples {
        if sample.len() != agents {
            return Err(ShapeError::AgentCount {
                expected: agents,
                actual: sample.len(),
            });
        }
        for (agent, ctx) in sample.iter().enumerate() {
            if ctx.window() != window {
                return Err(ShapeError::AdjacencyWindow {
                    agent,
                    expected: window,
                    actual: ctx.window(),
                });
            }
            flat.extend(ctx.selection_matrix(group));
        }
    }

    Ok(Tensor::<B, 1>::from_data(TensorData::from(flat.as_slice()), device)
        .reshape([samples.len(), agents, window, agents]))
}

/// Context row `[1, window]` that folds the attention output onto the self
/// slot.
pub fn context_vector<B: Backend>(window: usize, device: &B::Device) -> Tensor<B, 2> {
    let mut data = vec![0.0f32; window];
    if let Some(first) = data.first_mut() {
        *first = 1.0;
    }
    Tensor::<B, 1>::from_data(TensorData::from(data.as_slice()), device).reshape([1, window])
}

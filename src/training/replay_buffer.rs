use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::ai::Transition;

/// Fixed-capacity ring buffer of joint role-group transitions.
pub struct ReplayBuffer {
    buffer: Vec<Transition>,
    capacity: usize,
    position: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        ReplayBuffer {
            buffer: Vec::new(),
            capacity,
            position: 0,
            rng,
        }
    }

    /// Add a transition. Overwrites the oldest when full.
    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    /// Sample a batch without replacement.
    pub fn sample(&mut self, batch_size: usize) -> Vec<&Transition> {
        assert!(batch_size <= self.buffer.len(), "Not enough transitions to sample");
        let indices = index::sample(&mut self.rng, self.buffer.len(), batch_size);
        indices.iter().map(|i| &self.buffer[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::AdjacencyContext;

    fn transition(reward: f32) -> Transition {
        let adjacency = vec![AdjacencyContext {
            agent: 0,
            neighbors: vec![0, 0],
        }];
        Transition {
            observations: vec![vec![0.0; 4]],
            adjacency: adjacency.clone(),
            actions: vec![0],
            rewards: vec![reward],
            next_observations: vec![vec![0.0; 4]],
            next_adjacency: adjacency,
            dones: vec![false],
            terminal: false,
        }
    }

    #[test]
    fn test_push_and_len() {
        let mut buf = ReplayBuffer::new(10);
        assert!(buf.is_empty());

        buf.push(transition(0.0));
        assert_eq!(buf.len(), 1);

        for _ in 0..9 {
            buf.push(transition(0.0));
        }
        assert_eq!(buf.len(), 10);
        assert_eq!(buf.capacity(), 10);
    }

    #[test]
    fn test_ring_buffer_overwrites_oldest() {
        let mut buf = ReplayBuffer::with_seed(5, 1);
        for i in 0..8 {
            buf.push(transition(i as f32));
        }
        assert_eq!(buf.len(), 5);

        let mut rewards: Vec<f32> = buf.sample(5).iter().map(|t| t.rewards[0]).collect();
        rewards.sort_by(f32::total_cmp);
        assert_eq!(rewards, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_sample_is_distinct() {
        let mut buf = ReplayBuffer::with_seed(100, 7);
        for i in 0..50 {
            buf.push(transition(i as f32));
        }
        let mut rewards: Vec<f32> = buf.sample(10).iter().map(|t| t.rewards[0]).collect();
        assert_eq!(rewards.len(), 10);
        rewards.sort_by(f32::total_cmp);
        rewards.dedup();
        assert_eq!(rewards.len(), 10);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let fill = |buf: &mut ReplayBuffer| {
            for i in 0..20 {
                buf.push(transition(i as f32));
            }
        };
        let mut a = ReplayBuffer::with_seed(20, 42);
        let mut b = ReplayBuffer::with_seed(20, 42);
        fill(&mut a);
        fill(&mut b);
        let ra: Vec<f32> = a.sample(6).iter().map(|t| t.rewards[0]).collect();
        let rb: Vec<f32> = b.sample(6).iter().map(|t| t.rewards[0]).collect();
        assert_eq!(ra, rb);
    }

    #[test]
    #[should_panic(expected = "Not enough transitions")]
    fn test_sample_too_many() {
        let mut buf = ReplayBuffer::new(10);
        buf.push(transition(0.0));
        buf.sample(5);
    }
}

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Result of a single episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeResult {
    /// Reward summed over agents and steps.
    pub total_reward: f32,
    /// Reward summed over steps, per agent.
    pub agent_rewards: Vec<f32>,
    pub length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    update_losses: VecDeque<f32>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            update_losses: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    pub fn record_update(&mut self, loss: f32) {
        self.update_losses.push_back(loss);
        if self.update_losses.len() > self.capacity {
            self.update_losses.pop_front();
        }
    }

    /// Mean total episode reward over the last N episodes.
    pub fn mean_episode_reward(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.total_reward)
            .sum();
        sum / n as f32
    }

    /// Per-agent mean episode reward over the last N episodes.
    pub fn mean_agent_rewards(&self, last_n: usize) -> Vec<f32> {
        let n = self.episode_results.len().min(last_n);
        let Some(latest) = self.episode_results.back() else {
            return Vec::new();
        };
        let mut sums = vec![0.0f32; latest.agent_rewards.len()];
        for result in self.episode_results.iter().rev().take(n) {
            for (sum, reward) in sums.iter_mut().zip(&result.agent_rewards) {
                *sum += reward;
            }
        }
        sums.iter().map(|s| s / n as f32).collect()
    }

    /// Average loss over the last N updates.
    pub fn average_loss(&self, last_n: usize) -> f32 {
        let n = self.update_losses.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.update_losses.iter().rev().take(n).sum();
        sum / n as f32
    }

    /// Average episode length over the last N episodes.
    pub fn average_episode_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.length)
            .sum();
        total as f32 / n as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Throughput and update-time tracker for the progress log.
pub struct TimingMetrics {
    update_micros: VecDeque<u32>,
    capacity: usize,
    window_start: Instant,
    window_count: usize,
    window_overhead_micros: u128, // checkpoint time excluded from throughput
}

impl TimingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TimingMetrics {
            update_micros: VecDeque::with_capacity(capacity),
            capacity,
            window_start: Instant::now(),
            window_count: 0,
            window_overhead_micros: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self) {
        self.window_count += 1;
    }

    pub fn record_update_time(&mut self, d: Duration) {
        self.update_micros.push_back(d.as_micros() as u32);
        if self.update_micros.len() > self.capacity {
            self.update_micros.pop_front();
        }
    }

    /// Record time spent saving checkpoints so it is excluded from the
    /// throughput window.
    pub fn record_overhead(&mut self, d: Duration) {
        self.window_overhead_micros += d.as_micros();
    }

    /// Mean of the last `last_n` update times in milliseconds.
    pub fn avg_update_ms(&self, last_n: usize) -> f32 {
        let n = self.update_micros.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let mean = self
            .update_micros
            .iter()
            .rev()
            .take(n)
            .map(|&v| v as f64)
            .sum::<f64>()
            / n as f64;
        (mean / 1000.0) as f32
    }

    /// Wall-clock seconds since the last `reset_window` call.
    pub fn window_secs(&self) -> f32 {
        self.window_start.elapsed().as_secs_f32()
    }

    /// Episodes per second since the last `reset_window` call, excluding
    /// checkpoint overhead.
    pub fn episodes_per_sec(&self) -> f32 {
        let total_micros = self.window_start.elapsed().as_micros();
        let net_micros = total_micros.saturating_sub(self.window_overhead_micros);
        if net_micros == 0 {
            return 0.0;
        }
        self.window_count as f32 / (net_micros as f32 / 1_000_000.0)
    }

    /// Reset the throughput window (call after each log line).
    pub fn reset_window(&mut self) {
        self.window_start = Instant::now();
        self.window_count = 0;
        self.window_overhead_micros = 0;
    }
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(agent_rewards: Vec<f32>) -> EpisodeResult {
        EpisodeResult {
            total_reward: agent_rewards.iter().sum(),
            agent_rewards,
            length: 30,
        }
    }

    #[test]
    fn test_mean_episode_reward_uses_window() {
        let mut m = TrainingMetrics::new();
        m.record_episode(episode(vec![-10.0, -10.0]));
        m.record_episode(episode(vec![-1.0, -2.0]));
        m.record_episode(episode(vec![-3.0, -4.0]));

        assert!((m.mean_episode_reward(2) - (-5.0)).abs() < 1e-6);
        assert!((m.mean_episode_reward(10) - (-30.0 / 3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_mean_agent_rewards() {
        let mut m = TrainingMetrics::new();
        m.record_episode(episode(vec![-1.0, -2.0]));
        m.record_episode(episode(vec![-3.0, -4.0]));
        let means = m.mean_agent_rewards(10);
        assert_eq!(means.len(), 2);
        assert!((means[0] - (-2.0)).abs() < 1e-6);
        assert!((means[1] - (-3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_empty_metrics_are_zero() {
        let m = TrainingMetrics::new();
        assert_eq!(m.mean_episode_reward(10), 0.0);
        assert!(m.mean_agent_rewards(10).is_empty());
        assert_eq!(m.average_loss(10), 0.0);
        assert_eq!(m.average_episode_length(10), 0.0);
    }

    #[test]
    fn test_capacity_caps_window_not_total() {
        let mut m = TrainingMetrics::with_capacity(3);
        for i in 0..5 {
            m.record_episode(episode(vec![-(i as f32)]));
        }
        assert_eq!(m.total_episodes(), 5);
        // Only episodes 2, 3, 4 remain.
        assert!((m.mean_episode_reward(10) - (-3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_average_loss() {
        let mut m = TrainingMetrics::new();
        m.record_update(1.0);
        m.record_update(3.0);
        assert!((m.average_loss(10) - 2.0).abs() < 1e-6);
        assert!((m.average_loss(1) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_timing_avg_update_ms_last_n() {
        let mut t = TimingMetrics::new();
        t.record_update_time(Duration::from_micros(1000));
        t.record_update_time(Duration::from_micros(9000));
        t.record_update_time(Duration::from_micros(5000));
        assert!((t.avg_update_ms(1) - 5.0).abs() < 1e-3);
        assert!((t.avg_update_ms(100) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_overhead_excluded_from_eps_per_sec() {
        let mut t = TimingMetrics::new();
        for _ in 0..10 {
            t.record_episode();
        }
        t.record_overhead(Duration::from_secs(9999));
        assert_eq!(t.episodes_per_sec(), 0.0);

        t.reset_window();
        for _ in 0..5 {
            t.record_episode();
        }
        std::thread::sleep(Duration::from_millis(5));
        assert!(t.episodes_per_sec() > 0.0, "overhead should be cleared after reset");
    }
}

//! Adaptive Difficulty Adjustment
//!
//! Moves a topic's difficulty level from the learner's recent scores and the latest attempt:
//! - recent performance: mean of the last `window_size` scores
//! - learning rate: mean first difference over the same window
//! - consistency: 1 / (1 + variance) over the same window
//! - expected time grows geometrically with difficulty

use crate::pathway::config::DifficultyParams;
use crate::pathway::types::{DifficultyAdjustment, TopicPerformance};

const REASON_HIGH_PERFORMANCE: &str = "Consistent high performance";
const REASON_STRUGGLING: &str = "Struggling with current difficulty";
const REASON_FAST: &str = "Completing tasks quickly";
const REASON_SLOW: &str = "Taking longer than expected";
const REASON_ATTEMPTS: &str = "Multiple attempts needed";
const REASON_IMPROVING: &str = "Rapid improvement shown";
const REASON_CONSISTENT: &str = "Showing consistent performance";
const REASON_NONE: &str = "No significant change";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceStats {
    pub recent_performance: f64,
    pub learning_rate: f64,
    pub consistency_score: f64,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct DifficultyAdjuster {
    params: DifficultyParams,
    history_cap: usize,
}

impl DifficultyAdjuster {
    pub fn new(params: DifficultyParams, history_cap: usize) -> Self {
        let history_cap = history_cap.max(params.window_size).max(1);
        Self { params, history_cap }
    }

    pub fn current_difficulty(&self, performance: &TopicPerformance) -> f64 {
        performance.difficulty.unwrap_or(self.params.default_difficulty)
    }

    pub fn expected_time(&self, difficulty: f64) -> f64 {
        self.params.base_minutes * self.params.growth_factor.powf(difficulty - 1.0)
    }

    /// Records `score` and moves the stored difficulty. Inputs are assumed validated.
    pub fn adjust(
        &self,
        topic_id: &str,
        performance: &mut TopicPerformance,
        score: f64,
        time_spent_minutes: f64,
        attempts: u32,
    ) -> DifficultyAdjustment {
        let p = &self.params;
        let previous = self.current_difficulty(performance);

        performance.history.push_back(score);
        while performance.history.len() > self.history_cap {
            performance.history.pop_front();
        }

        let stats = self.stats(performance);
        let expected_time = self.expected_time(previous);

        let mut delta = 0.0;
        let mut reasons: Vec<&str> = Vec::new();
        let mut fire = |condition: bool, step: f64, reason: &'static str| {
            if condition {
                delta += step;
                reasons.push(reason);
            }
        };

        fire(stats.recent_performance > p.high_performance, p.performance_step, REASON_HIGH_PERFORMANCE);
        fire(stats.recent_performance < p.low_performance, -p.performance_step, REASON_STRUGGLING);
        fire(time_spent_minutes < p.fast_ratio * expected_time, p.time_step, REASON_FAST);
        fire(time_spent_minutes > p.slow_ratio * expected_time, -p.time_step, REASON_SLOW);
        fire(attempts > p.max_attempts, -p.attempts_step, REASON_ATTEMPTS);
        fire(stats.learning_rate > p.rapid_learning_rate, p.learning_rate_step, REASON_IMPROVING);
        // a window too short to measure spread does not count as consistent
        fire(
            stats.samples >= 3 && stats.consistency_score > p.consistency_threshold,
            p.consistency_step,
            REASON_CONSISTENT,
        );

        let new_difficulty = (previous + delta).clamp(p.min_difficulty, p.max_difficulty);
        performance.difficulty = Some(new_difficulty);

        let reason = if reasons.is_empty() {
            REASON_NONE.to_string()
        } else {
            reasons.join(", ")
        };
        let feedback = vec![feedback_sentence(previous, new_difficulty, &reason)];

        tracing::debug!(
            topic_id,
            previous,
            new_difficulty,
            reason = %reason,
            "difficulty adjusted"
        );

        DifficultyAdjustment {
            topic_id: topic_id.to_string(),
            previous_difficulty: previous,
            new_difficulty,
            reason,
            feedback,
            recent_performance: stats.recent_performance,
            learning_rate: stats.learning_rate,
            consistency_score: stats.consistency_score,
            expected_time,
        }
    }

    pub fn stats(&self, performance: &TopicPerformance) -> PerformanceStats {
        let history = &performance.history;
        let start = history.len().saturating_sub(self.params.window_size);
        let window: Vec<f64> = history.iter().skip(start).copied().collect();

        PerformanceStats {
            recent_performance: mean(&window).unwrap_or(0.5),
            learning_rate: learning_rate(&window),
            consistency_score: consistency(&window),
            samples: window.len(),
        }
    }
}

impl Default for DifficultyAdjuster {
    fn default() -> Self {
        Self::new(DifficultyParams::default(), 20)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn learning_rate(window: &[f64]) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = window.windows(2).map(|pair| pair[1] - pair[0]).collect();
    mean(&diffs).unwrap_or(0.0)
}

fn consistency(window: &[f64]) -> f64 {
    if window.len() < 3 {
        return 1.0;
    }
    let avg = mean(window).unwrap_or(0.0);
    let variance = window.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / window.len() as f64;
    1.0 / (1.0 + variance)
}

fn feedback_sentence(previous: f64, new_difficulty: f64, reason: &str) -> String {
    if new_difficulty > previous {
        format!("Great progress! Increasing the challenge because: {reason}.")
    } else if new_difficulty < previous {
        format!("Let's adjust the pace. Reducing difficulty because: {reason}.")
    } else {
        format!("Keeping the current difficulty level. Observations: {reason}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_history(scores: &[f64], difficulty: Option<f64>) -> TopicPerformance {
        TopicPerformance {
            history: scores.iter().copied().collect(),
            difficulty,
        }
    }

    #[test]
    fn test_first_attempt_high_and_fast() {
        let adjuster = DifficultyAdjuster::default();
        let mut perf = TopicPerformance::default();
        let result = adjuster.adjust("x", &mut perf, 0.9, 2.0, 1);

        assert_eq!(result.previous_difficulty, 5.0);
        assert!((result.new_difficulty - 5.8).abs() < 1e-9);
        assert!(result.reason.contains("Consistent high performance"));
        assert!(result.reason.contains("Completing tasks quickly"));
        assert_eq!(perf.difficulty, Some(result.new_difficulty));
        assert_eq!(perf.history.len(), 1);
        assert!(result.feedback[0].starts_with("Great progress!"));
    }

    #[test]
    fn test_struggling_and_slow_lowers_difficulty() {
        let adjuster = DifficultyAdjuster::default();
        let mut perf = with_history(&[0.2, 0.25], Some(5.0));
        let expected = adjuster.expected_time(5.0);
        let result = adjuster.adjust("x", &mut perf, 0.1, expected * 2.0, 5);

        // -0.5 struggling, -0.3 slow, -0.2 attempts, +0.1 consistent
        assert!((result.new_difficulty - 4.1).abs() < 1e-9, "{}", result.new_difficulty);
        assert!(result.reason.contains("Struggling with current difficulty"));
        assert!(result.reason.contains("Taking longer than expected"));
        assert!(result.reason.contains("Multiple attempts needed"));
        assert!(result.feedback[0].starts_with("Let's adjust the pace."));
    }

    #[test]
    fn test_learning_rate_and_consistency() {
        let adjuster = DifficultyAdjuster::default();
        let perf = with_history(&[0.1, 0.3, 0.5, 0.7, 0.9], None);
        let stats = adjuster.stats(&perf);
        assert!((stats.learning_rate - 0.2).abs() < 1e-9);
        assert!((stats.recent_performance - 0.5).abs() < 1e-9);
        // variance 0.08
        assert!((stats.consistency_score - 1.0 / 1.08).abs() < 1e-9);
    }

    #[test]
    fn test_stats_read_only_last_window() {
        let adjuster = DifficultyAdjuster::default();
        let perf = with_history(&[0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0], None);
        let stats = adjuster.stats(&perf);
        assert_eq!(stats.samples, 5);
        assert_eq!(stats.recent_performance, 1.0);
        assert_eq!(stats.learning_rate, 0.0);
        assert_eq!(stats.consistency_score, 1.0);
    }

    #[test]
    fn test_empty_history_defaults() {
        let adjuster = DifficultyAdjuster::default();
        let stats = adjuster.stats(&TopicPerformance::default());
        assert_eq!(stats.recent_performance, 0.5);
        assert_eq!(stats.learning_rate, 0.0);
        assert_eq!(stats.consistency_score, 1.0);
    }

    #[test]
    fn test_unchanged_when_nothing_fires() {
        let adjuster = DifficultyAdjuster::default();
        let expected = adjuster.expected_time(5.0);
        let mut perf = TopicPerformance::default();
        let result = adjuster.adjust("x", &mut perf, 0.5, expected, 1);
        assert_eq!(result.new_difficulty, 5.0);
        assert_eq!(result.reason, "No significant change");
        assert!(result.feedback[0].starts_with("Keeping the current difficulty level."));
    }

    #[test]
    fn test_clamped_at_bounds() {
        let adjuster = DifficultyAdjuster::default();
        let mut perf = with_history(&[1.0, 1.0, 1.0], Some(9.9));
        let result = adjuster.adjust("x", &mut perf, 1.0, 0.0, 1);
        assert_eq!(result.new_difficulty, 10.0);

        let mut perf = with_history(&[0.0, 0.0], Some(1.2));
        let result = adjuster.adjust("x", &mut perf, 0.0, 10_000.0, 9);
        assert_eq!(result.new_difficulty, 1.0);
    }

    #[test]
    fn test_history_capped() {
        let adjuster = DifficultyAdjuster::new(DifficultyParams::default(), 8);
        let mut perf = TopicPerformance::default();
        for _ in 0..30 {
            adjuster.adjust("x", &mut perf, 0.6, 10.0, 1);
        }
        assert_eq!(perf.history.len(), 8);
    }

    #[test]
    fn test_expected_time_growth() {
        let adjuster = DifficultyAdjuster::default();
        assert_eq!(adjuster.expected_time(1.0), 5.0);
        assert!((adjuster.expected_time(3.0) - 11.25).abs() < 1e-9);
    }
}

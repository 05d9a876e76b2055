use std::time::Duration;

/// Decision returned by the retry policy after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up on this file.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Attempt cap plus exponential backoff between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff; zero retries immediately.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` attempts with no delay between them.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Whether another attempt follows failed attempt number `attempt` (1-based).
    pub fn will_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Next backoff delay after failed attempt number `attempt` (1-based).
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if !self.will_retry(attempt) {
            return RetryDecision::NoRetry;
        }
        // base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::default();
        assert!(matches!(p.decide(1), RetryDecision::RetryAfter(_)));
        assert!(matches!(p.decide(2), RetryDecision::RetryAfter(_)));
        assert_eq!(p.decide(3), RetryDecision::NoRetry);
        assert!(p.will_retry(2));
        assert!(!p.will_retry(3));
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 20;
        let delay = |a| match p.decide(a) {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected retry"),
        };
        assert_eq!(delay(1), Duration::from_secs(1));
        assert_eq!(delay(2), Duration::from_secs(2));
        assert!(delay(3) >= delay(2));
        assert_eq!(delay(10), p.max_delay);
    }

    #[test]
    fn immediate_has_no_delay() {
        let p = RetryPolicy::immediate(3);
        assert_eq!(p.decide(1), RetryDecision::RetryAfter(Duration::ZERO));
        assert_eq!(p.decide(3), RetryDecision::NoRetry);
    }
}

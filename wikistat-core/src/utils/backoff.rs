use rand::Rng;
use std::time::Duration;

/// Largest exponent used for exponential backoff (2^16 × initial).
const MAX_EXPONENT: u32 = 16;

/// How long to wait before restarting a failed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every restart.
    Fixed(Duration),
    /// `initial × 2^attempt`, capped at `max`. With `jitter` the delay is
    /// drawn uniformly from the upper half of that value.
    Exponential {
        initial: Duration,
        max: Duration,
        jitter: bool,
    },
}

impl Backoff {
    /// Delay before restart number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential {
                initial,
                max,
                jitter,
            } => {
                let factor = 2u32.pow(attempt.min(MAX_EXPONENT));
                let delay = initial.saturating_mul(factor).min(max);
                if jitter && !delay.is_zero() {
                    let half = delay / 2;
                    rand::rng().random_range(half..=delay)
                } else {
                    delay
                }
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed(Duration::from_secs(1))
    }
}

/// Restart policy of a supervised task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartPolicy {
    pub backoff: Backoff,
    /// `None` restarts forever.
    pub max_restarts: Option<u32>,
}

impl RestartPolicy {
    /// Restart forever, waiting `delay` each time.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            backoff: Backoff::Fixed(delay),
            max_restarts: None,
        }
    }

    /// Delay before restart number `attempt`, or `None` once the restart
    /// budget is spent.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match self.max_restarts {
            Some(max) if attempt >= max => None,
            _ => Some(self.backoff.delay(attempt)),
        }
    }
}

use std::time::Duration;

/// Limits of a live filtered fetch. Whichever is hit first ends the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_events: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_events: 10,
        }
    }
}

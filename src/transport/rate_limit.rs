// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Client-side token bucket throttle.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

/// Shared token bucket limiting the rate of outgoing requests.
///
/// Tokens are replenished at a fixed rate and each [`acquire`](Self::acquire)
/// consumes one, waiting when none is available. Clones draw from the same
/// bucket. [`RequestExecutor`](super::RequestExecutor) acquires a token
/// before each attempt.
///
/// ```rust
/// use std::time::Duration;
/// use web3_query::transport::RateLimiter;
///
/// // Allow 100 requests per minute
/// let limiter = RateLimiter::new(100, Duration::from_secs(60));
/// ```
#[derive(Clone, Debug)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimitState>>,
}

impl RateLimiter {
    /// Admit `requests` per `period`.
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState::new(requests, period))),
        }
    }

    /// Convenience constructor for a per-second limit.
    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        loop {
            let wait_time = {
                let mut state = self.state.lock().await;
                state.try_acquire()
            };

            match wait_time {
                None => break,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
}

#[derive(Debug)]
struct RateLimitState {
    /// Maximum number of tokens (requests) available
    capacity: u32,
    /// Current number of available tokens
    tokens: f64,
    /// Token replenishment rate (tokens per nanosecond)
    refill_rate: f64,
    last_refill: Instant,
}

impl RateLimitState {
    fn new(requests: u32, period: Duration) -> Self {
        // A zero limit would never refill; treat it as one request per period.
        let requests = requests.max(1);
        let period_nanos = period.as_nanos().max(1) as f64;
        Self {
            capacity: requests,
            tokens: requests as f64,
            refill_rate: requests as f64 / period_nanos,
            last_refill: Instant::now(),
        }
    }

    /// Take a token, or return how long to wait for the next one.
    fn try_acquire(&mut self) -> Option<Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let needed = 1.0 - self.tokens;
            let wait_nanos = needed / self.refill_rate;
            Some(Duration::from_nanos(wait_nanos as u64))
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_nanos() as f64 * self.refill_rate;

        self.tokens = (self.tokens + new_tokens).min(self.capacity as f64);
        self.last_refill = now;
    }
}

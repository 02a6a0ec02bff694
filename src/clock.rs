//! Injectable clock for poll-loop suspension
//!
//! The poll loop is the only place the library suspends, and it always
//! suspends through this trait. Production code uses [`TokioClock`]; tests
//! inject a virtual clock that advances instantly, so no test ever sleeps a
//! real poll interval.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Time source and sleep provider
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant, used for elapsed-time reporting
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by `tokio::time`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

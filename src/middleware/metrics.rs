use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::{Middleware, Next};
use crate::dispatcher::{HandlerRequest, HandlerResult};

/// Middleware for collecting request metrics
///
/// All counters use atomic operations for thread-safe updates without locks.
///
/// Metrics collected:
/// - Total request count
/// - Requests whose chain returned an error
/// - Requests answered with a 4xx/5xx status
/// - Average latency of the wrapped chain
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    error_count: AtomicUsize,
    failure_status_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

/// Creates a new instance with all atomic counters set to zero.
impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            error_count: AtomicUsize::new(0),
            failure_status_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
        }
    }
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with all counters initialized to zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Number of requests whose chain returned an `Err`
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Number of responses with a status of 400 or above
    pub fn failure_status_count(&self) -> usize {
        self.failure_status_count.load(Ordering::Relaxed)
    }

    /// Calculate the average request latency
    ///
    /// Returns zero duration if no requests have been processed yet.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

/// Passive: never blocks requests, only observes and records.
///
/// Uses `Ordering::Relaxed`; metrics are eventually consistent but cheap to collect.
impl Middleware for MetricsMiddleware {
    fn handle(&self, req: &mut HandlerRequest, next: Next<'_>) -> HandlerResult {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let result = next.run(req);

        self.total_latency_ns
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
        match &result {
            Ok(res) if res.status >= 400 => {
                self.failure_status_count.fetch_add(1, Ordering::Relaxed);
            }
            Ok(_) => {}
            Err(_) => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }
}

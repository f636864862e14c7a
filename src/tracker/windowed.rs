//! Bounded-memory windowed unique counting
//!
//! Tracks unique clients over a fixed trailing period instead of the
//! process lifetime. Entries expire `period_secs` after insertion and the
//! window holds at most `period_secs * expected_concurrency` of them; when
//! that capacity is reached the oldest-inserted entry is evicted to admit
//! the new one. The total hit counter sits outside the window and never
//! decreases.
//!
//! Expiry is lazy: expired entries are swept out on the next insert or
//! query rather than by a background task, and a query never reports an
//! expired entry whether or not it has been physically removed.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::WindowConfig;
use crate::identity::Identity;
use crate::tracker::{Tracker, TrackerError, TrackerResult};

/// Longest accepted window period, ten years. Bounding it keeps every
/// computed deadline inside `Instant`'s representable range.
const MAX_PERIOD_SECS: u64 = 60 * 60 * 24 * 365 * 10;

/// Identity window with a uniform per-entry expiry.
///
/// An identity is admitted at most once while live (a re-hit does not
/// refresh its deadline) and every admitted deadline is clamped to at
/// least the deque back's, so the deque stays sorted by deadline: the
/// front is simultaneously the oldest-inserted entry (the capacity
/// eviction victim) and the first to expire (the sweep target).
struct Window {
    /// Expiry deadline for every live identity.
    live: HashMap<Identity, Instant>,
    /// `(identity, deadline)` pairs in insertion order, front = oldest.
    order: VecDeque<(Identity, Instant)>,
}

pub struct WindowedTracker {
    window: Mutex<Window>,
    capacity: usize,
    period: Duration,
    total_hits: AtomicU64,
}

impl WindowedTracker {
    /// Build a windowed tracker from its configuration.
    ///
    /// The period must be positive and at most [`MAX_PERIOD_SECS`], the
    /// concurrency positive, and the capacity product representable. Any
    /// out-of-range value is a configuration error and the tracker is
    /// never constructed.
    pub fn new(config: &WindowConfig) -> TrackerResult<Self> {
        if config.period_secs == 0 {
            return Err(TrackerError::Configuration(
                "window period must be at least one second".to_string(),
            ));
        }
        if config.period_secs > MAX_PERIOD_SECS {
            return Err(TrackerError::Configuration(format!(
                "window period must be at most {MAX_PERIOD_SECS} seconds"
            )));
        }
        if config.expected_concurrency == 0 {
            return Err(TrackerError::Configuration(
                "expected concurrency must be at least one".to_string(),
            ));
        }

        let capacity = config
            .period_secs
            .checked_mul(config.expected_concurrency)
            .and_then(|capacity| usize::try_from(capacity).ok())
            .ok_or_else(|| {
                TrackerError::Configuration(
                    "window capacity (period x concurrency) is too large".to_string(),
                )
            })?;

        Ok(Self {
            window: Mutex::new(Window {
                live: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
            period: Duration::from_secs(config.period_secs),
            total_hits: AtomicU64::new(0),
        })
    }

    fn lock_window(&self) -> MutexGuard<'_, Window> {
        // Poisoning would require a panic inside the critical section,
        // which contains none; recover the guard rather than propagate
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every entry whose deadline has passed. Expired entries always
    /// form a prefix of the order queue because deadlines are
    /// non-decreasing along it.
    fn sweep(window: &mut Window, now: Instant) {
        while let Some(&(id, deadline)) = window.order.front() {
            if deadline > now {
                break;
            }
            window.order.pop_front();
            window.live.remove(&id);
        }
    }

    fn record_in(&self, window: &mut Window, id: Identity, now: Instant) {
        Self::sweep(window, now);

        // Insert-only: a re-hit from a live identity keeps its original
        // deadline
        if window.live.contains_key(&id) {
            return;
        }

        // Capacity pressure evicts the oldest entry, never rejects the write
        if window.live.len() >= self.capacity {
            if let Some((oldest, _)) = window.order.pop_front() {
                window.live.remove(&oldest);
            }
        }

        // The sweep needs the deque sorted by deadline, so an admission
        // never lands before the current back
        let mut deadline = now + self.period;
        if let Some(&(_, back)) = window.order.back() {
            deadline = deadline.max(back);
        }
        window.live.insert(id, deadline);
        window.order.push_back((id, deadline));
    }

    #[cfg(test)]
    fn record_at(&self, id: Identity, now: Instant) {
        let mut window = self.lock_window();
        self.record_in(&mut window, id, now);
    }

    #[cfg(test)]
    fn unique_count_at(&self, now: Instant) -> u64 {
        let mut window = self.lock_window();
        Self::sweep(&mut window, now);
        window.live.len() as u64
    }

    #[cfg(test)]
    fn is_live_at(&self, id: Identity, now: Instant) -> bool {
        let mut window = self.lock_window();
        Self::sweep(&mut window, now);
        window.live.contains_key(&id)
    }
}

#[async_trait]
impl Tracker for WindowedTracker {
    async fn increment_total(&self) -> TrackerResult<()> {
        self.total_hits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn record(&self, id: Identity) -> TrackerResult<()> {
        // Sampling the clock under the lock keeps admission times
        // non-decreasing
        let mut window = self.lock_window();
        self.record_in(&mut window, id, Instant::now());
        Ok(())
    }

    async fn unique_count(&self) -> TrackerResult<u64> {
        let mut window = self.lock_window();
        Self::sweep(&mut window, Instant::now());
        Ok(window.live.len() as u64)
    }

    async fn total_count(&self) -> TrackerResult<u64> {
        Ok(self.total_hits.load(Ordering::Relaxed))
    }
}

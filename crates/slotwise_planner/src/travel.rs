// --- File: crates/slotwise_planner/src/travel.rs ---
//! Travel time estimation with a shared, time-limited cache.
//!
//! The [`TravelEstimator`] wraps a [`TravelProvider`] and adds caching,
//! per-lookup timeouts, a global concurrency limit and cancellation. Cache
//! keys are directional: A→B and B→A are looked up separately.

use crate::error::{PlannerError, TravelProviderError};
use chrono::Duration;
use dashmap::DashMap;
use futures::future::join_all;
use slotwise_common::{BoxFuture, Location};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Transport that answers "how long from A to B".
///
/// Implementations do not cache; the estimator does.
pub trait TravelProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn travel_time(
        &self,
        from: Location,
        to: Location,
    ) -> BoxFuture<'_, Duration, TravelProviderError>;
}

/// A coordinate rounded to a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey {
    lat: i64,
    lng: i64,
}

impl CoordKey {
    pub fn new(location: Location, precision: u32) -> Self {
        let scale = 10f64.powi(precision as i32);
        Self {
            lat: (location.lat * scale).round() as i64,
            lng: (location.lng * scale).round() as i64,
        }
    }
}

/// Directional cache key for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegKey {
    pub from: CoordKey,
    pub to: CoordKey,
}

impl LegKey {
    pub fn new(from: Location, to: Location, precision: u32) -> Self {
        Self {
            from: CoordKey::new(from, precision),
            to: CoordKey::new(to, precision),
        }
    }

    /// Both ends round to the same point.
    pub fn is_stationary(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    duration: Duration,
    inserted_at: Instant,
}

/// Concurrent TTL cache of travel durations.
///
/// Expired entries are dropped on read. When full, expired entries are evicted
/// first, then the oldest insertion. Writers to the same key race with
/// last-writer-wins.
#[derive(Debug)]
pub struct TravelCache {
    entries: DashMap<LegKey, CacheEntry>,
    ttl: std::time::Duration,
    capacity: usize,
}

impl TravelCache {
    pub fn new(ttl: std::time::Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &LegKey) -> Option<Duration> {
        let hit = self
            .entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.duration);
        if hit.is_none() {
            // The read guard is gone; safe to take the shard write lock
            self.entries
                .remove_if(key, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
        }
        hit
    }

    pub fn insert(&self, key: LegKey, duration: Duration) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(
            key,
            CacheEntry {
                duration,
                inserted_at: Instant::now(),
            },
        );
    }

    fn evict(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().inserted_at)
                .map(|entry| *entry.key());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Tuning for [`TravelEstimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorOptions {
    /// Decimal places kept in cache keys.
    pub precision: u32,
    pub timeout: std::time::Duration,
    pub max_concurrent_lookups: usize,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            precision: 4,
            timeout: std::time::Duration::from_secs(10),
            max_concurrent_lookups: 8,
        }
    }
}

/// Results of one batch of leg lookups.
#[derive(Debug, Clone, Default)]
pub struct LegEstimates {
    precision: u32,
    outcomes: HashMap<LegKey, Result<Duration, PlannerError>>,
    order: Vec<LegKey>,
}

impl LegEstimates {
    pub fn lookup(&self, from: Location, to: Location) -> Option<&Result<Duration, PlannerError>> {
        self.outcomes.get(&LegKey::new(from, to, self.precision))
    }

    /// Failed legs, in the order they were first requested.
    pub fn failures(&self) -> impl Iterator<Item = &PlannerError> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.outcomes.get(key))
            .filter_map(|outcome| outcome.as_ref().err())
    }

    /// Number of distinct legs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Cached, bounded and cancellable access to a [`TravelProvider`].
pub struct TravelEstimator {
    provider: Arc<dyn TravelProvider>,
    cache: Arc<TravelCache>,
    options: EstimatorOptions,
    limiter: Arc<Semaphore>,
}

impl TravelEstimator {
    pub fn new(
        provider: Arc<dyn TravelProvider>,
        cache: Arc<TravelCache>,
        options: EstimatorOptions,
    ) -> Self {
        Self {
            provider,
            cache,
            limiter: Arc::new(Semaphore::new(options.max_concurrent_lookups.max(1))),
            options,
        }
    }

    pub fn cache(&self) -> &Arc<TravelCache> {
        &self.cache
    }

    pub fn key(&self, from: Location, to: Location) -> LegKey {
        LegKey::new(from, to, self.options.precision)
    }

    /// Estimates a single leg, consulting and filling the cache.
    pub async fn estimate(&self, from: Location, to: Location) -> Result<Duration, PlannerError> {
        let key = self.key(from, to);
        if let Some(duration) = self.known(&key) {
            return Ok(duration);
        }
        let duration = self.lookup_upstream(from, to).await?;
        self.cache.insert(key, duration);
        Ok(duration)
    }

    /// Estimates every distinct leg in `legs` with at most one upstream call
    /// per leg.
    ///
    /// Failed legs are returned inside [`LegEstimates`]. If `cancel` fires
    /// first, in-flight lookups are dropped, nothing is cached and
    /// [`PlannerError::Cancelled`] is returned.
    pub async fn estimate_batch(
        &self,
        legs: &[(Location, Location)],
        cancel: &CancellationToken,
    ) -> Result<LegEstimates, PlannerError> {
        let mut estimates = LegEstimates {
            precision: self.options.precision,
            ..Default::default()
        };
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for &(from, to) in legs {
            let key = self.key(from, to);
            if !seen.insert(key) {
                continue;
            }
            estimates.order.push(key);
            match self.known(&key) {
                Some(duration) => {
                    estimates.outcomes.insert(key, Ok(duration));
                }
                None => pending.push((key, from, to)),
            }
        }

        if cancel.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }
        if pending.is_empty() {
            return Ok(estimates);
        }

        debug!(
            "{} distinct legs, {} need a {} lookup",
            estimates.order.len(),
            pending.len(),
            self.provider.name()
        );
        let lookups = pending.into_iter().map(|(key, from, to)| async move {
            (key, self.lookup_upstream(from, to).await)
        });

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Travel lookups cancelled");
                return Err(PlannerError::Cancelled);
            }
            results = join_all(lookups) => results,
        };

        for (key, outcome) in results {
            if let Ok(duration) = &outcome {
                self.cache.insert(key, *duration);
            }
            estimates.outcomes.insert(key, outcome);
        }
        Ok(estimates)
    }

    fn known(&self, key: &LegKey) -> Option<Duration> {
        if key.is_stationary() {
            return Some(Duration::zero());
        }
        self.cache.get(key)
    }

    async fn lookup_upstream(&self, from: Location, to: Location) -> Result<Duration, PlannerError> {
        let unavailable = |reason| PlannerError::TravelUnavailable { from, to, reason };

        let _permit = self.limiter.acquire().await.map_err(|_| {
            unavailable(TravelProviderError::Network {
                url: self.provider.name().to_string(),
                message: "lookup limiter closed".to_string(),
            })
        })?;

        match tokio::time::timeout(self.options.timeout, self.provider.travel_time(from, to)).await {
            Ok(Ok(duration)) => Ok(round_up_to_minutes(duration)),
            Ok(Err(reason)) => {
                warn!("{} lookup {} -> {} failed: {}", self.provider.name(), from, to, reason);
                Err(unavailable(reason))
            }
            Err(_) => {
                warn!(
                    "{} lookup {} -> {} timed out after {:?}",
                    self.provider.name(),
                    from,
                    to,
                    self.options.timeout
                );
                Err(unavailable(TravelProviderError::Timeout(format!(
                    "no answer within {}s",
                    self.options.timeout.as_secs_f64()
                ))))
            }
        }
    }
}

/// Rounds a duration up to whole minutes; negative values become zero.
pub fn round_up_to_minutes(duration: Duration) -> Duration {
    if duration <= Duration::zero() {
        return Duration::zero();
    }
    let minutes = duration.num_minutes();
    if duration > Duration::minutes(minutes) {
        Duration::minutes(minutes + 1)
    } else {
        Duration::minutes(minutes)
    }
}

/// Scripted provider for tests and benchmarks.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// What the provider answers for one leg.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ScriptedLeg {
        Takes(Duration),
        Fails(TravelProviderError),
        /// Never answers.
        Hangs,
    }

    pub struct ScriptedTravelProvider {
        legs: Mutex<HashMap<LegKey, ScriptedLeg>>,
        default: ScriptedLeg,
        delay: Option<std::time::Duration>,
        calls: Mutex<Vec<(Location, Location)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    struct InFlight<'a>(&'a AtomicUsize);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl ScriptedTravelProvider {
        /// Every leg not scripted otherwise takes `default`.
        pub fn new(default: Duration) -> Self {
            Self {
                legs: Mutex::new(HashMap::new()),
                default: ScriptedLeg::Takes(default),
                delay: None,
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn with_leg(self, from: Location, to: Location, leg: ScriptedLeg) -> Self {
            self.set_leg(from, to, leg);
            self
        }

        /// Simulated network latency per call.
        pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn set_leg(&self, from: Location, to: Location, leg: ScriptedLeg) {
            self.legs
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(LegKey::new(from, to, 4), leg);
        }

        /// Total number of upstream calls.
        pub fn call_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .len()
        }

        pub fn calls_for(&self, from: Location, to: Location) -> usize {
            let key = LegKey::new(from, to, 4);
            self.calls
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .iter()
                .filter(|(f, t)| LegKey::new(*f, *t, 4) == key)
                .count()
        }

        /// Highest number of calls that were running at the same time.
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        fn script_for(&self, from: Location, to: Location) -> ScriptedLeg {
            self.legs
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .get(&LegKey::new(from, to, 4))
                .cloned()
                .unwrap_or_else(|| self.default.clone())
        }
    }

    impl TravelProvider for ScriptedTravelProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn travel_time(
            &self,
            from: Location,
            to: Location,
        ) -> BoxFuture<'_, Duration, TravelProviderError> {
            Box::pin(async move {
                self.calls
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push((from, to));
                let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(running, Ordering::SeqCst);
                let _guard = InFlight(&self.in_flight);

                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                match self.script_for(from, to) {
                    ScriptedLeg::Takes(duration) => Ok(duration),
                    ScriptedLeg::Fails(err) => Err(err),
                    ScriptedLeg::Hangs => std::future::pending().await,
                }
            })
        }
    }
}

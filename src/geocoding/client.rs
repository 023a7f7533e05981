use crate::geocoding::{Clock, GeocodeProvider, SystemClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{direct::NotKeyed, InMemoryState};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub resolved_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub province: String,
}

impl AddressQuery {
    pub fn new(address: &str, neighborhood: &str, province: &str) -> Self {
        Self {
            address: address.to_string(),
            neighborhood: neighborhood.to_string(),
            province: province.to_string(),
        }
    }

    fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.address.trim(),
            self.neighborhood.trim(),
            self.province.trim()
        )
        .to_lowercase()
    }

    fn full_text(&self) -> Option<String> {
        join_parts(&[
            self.address.as_str(),
            self.neighborhood.as_str(),
            self.province.as_str(),
        ])
    }

    fn locality_text(&self) -> Option<String> {
        join_parts(&[self.neighborhood.as_str(), self.province.as_str()])
    }
}

fn join_parts(parts: &[&str]) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

type CallLimiter<C> =
    RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as governor::clock::Clock>::Instant>>;

/// One external call per second, with no burst.
fn call_limiter<C: Clock>(clock: &C) -> CallLimiter<C> {
    RateLimiter::direct_with_clock(Quota::per_second(NonZeroU32::MIN), clock)
}

type Cache = HashMap<String, Option<GeocodeResult>>;

/// The process-wide geocoder the server shares between workers.
pub type SharedGeocoder = Geocoder<Box<dyn GeocodeProvider>, SystemClock>;

/// Address → coordinates with a cache and a one-call-per-second limit.
///
/// One instance is meant to live for the whole process. Cache hits only take
/// the cache lock. External lookups run one at a time behind the limiter lock,
/// so concurrent misses queue up while hits stay immediate.
pub struct Geocoder<P, C: Clock> {
    provider: P,
    clock: C,
    cache: Mutex<Cache>,
    limiter: Mutex<CallLimiter<C>>,
}

impl<P: GeocodeProvider, C: Clock> Geocoder<P, C> {
    pub fn new(provider: P, clock: C) -> Self {
        let limiter = call_limiter(&clock);
        Self {
            provider,
            clock,
            cache: Mutex::new(HashMap::new()),
            limiter: Mutex::new(limiter),
        }
    }

    // A panic mid-lookup leaves both locks usable.
    fn lock_cache(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_limiter(&self) -> MutexGuard<'_, CallLimiter<C>> {
        self.limiter.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn cached(&self, key: &str) -> Option<Option<GeocodeResult>> {
        let hit = self.lock_cache().get(key).cloned();
        if hit.is_some() {
            log::debug!("Geocode cache hit for '{key}'");
        }
        hit
    }

    /// Resolves an address, falling back to neighborhood + province when the
    /// full address finds nothing. Never fails: provider errors count as
    /// "not found" and are cached like any other miss.
    pub fn resolve(&self, query: &AddressQuery) -> Option<GeocodeResult> {
        let key = query.cache_key();
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let limiter = self.lock_limiter();
        // Someone else may have looked this key up while we waited.
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let result = self.lookup(&limiter, query);
        self.lock_cache().insert(key, result.clone());
        result
    }

    pub fn resolve_parts(
        &self,
        address: &str,
        neighborhood: &str,
        province: &str,
    ) -> Option<GeocodeResult> {
        self.resolve(&AddressQuery::new(address, neighborhood, province))
    }

    fn lookup(&self, limiter: &CallLimiter<C>, query: &AddressQuery) -> Option<GeocodeResult> {
        let full = query.full_text()?;

        match self.search(limiter, &full) {
            Lookup::Found(result) => return Some(result),
            Lookup::Failed => return None,
            Lookup::Empty => {}
        }

        let locality = query.locality_text()?;
        if locality == full {
            return None;
        }
        log::debug!("No match for '{full}', trying '{locality}'");
        match self.search(limiter, &locality) {
            Lookup::Found(result) => Some(result),
            Lookup::Empty | Lookup::Failed => None,
        }
    }

    fn search(&self, limiter: &CallLimiter<C>, text: &str) -> Lookup {
        self.wait_for_slot(limiter);

        match self.provider.search(text) {
            Ok(candidates) => match candidates.into_iter().next() {
                Some(c) => Lookup::Found(GeocodeResult {
                    lat: c.lat,
                    lng: c.lng,
                    resolved_address: c.display_name,
                }),
                None => Lookup::Empty,
            },
            Err(e) => {
                log::warn!("Geocoding '{text}' failed: {e}");
                Lookup::Failed
            }
        }
    }

    fn wait_for_slot(&self, limiter: &CallLimiter<C>) {
        while let Err(not_until) = limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            log::debug!("Geocoder rate limit: sleeping {}ms", wait.as_millis());
            self.clock.sleep(wait);
        }
    }

    /// Resolves each query in order, calling `on_progress(done, total)` after
    /// every item.
    pub fn resolve_batch<F>(
        &self,
        queries: &[AddressQuery],
        mut on_progress: F,
    ) -> Vec<Option<GeocodeResult>>
    where
        F: FnMut(usize, usize),
    {
        let total = queries.len();
        queries
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let result = self.resolve(q);
                on_progress(i + 1, total);
                result
            })
            .collect()
    }

    /// Forgets cached results and starts the limiter over. Waits for any
    /// lookup in flight.
    pub fn clear(&self) {
        let mut limiter = self.lock_limiter();
        *limiter = call_limiter(&self.clock);
        self.lock_cache().clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.lock_cache().len()
    }
}

enum Lookup {
    Found(GeocodeResult),
    Empty,
    Failed,
}

// 🔑 Identifier Registry - natural keys → dense surrogate keys
//
// GTFS files reference each other through string ids (route_id, stop_id, ...).
// Every domain gets its own counter; the first time a key is seen it receives
// `len + 1`. The empty key is "no reference" and always maps to 0.

use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// DOMAINS
// ============================================================================

/// A natural-key namespace. Keys from different domains never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdDomain {
    Route,
    Service,
    Trip,
    Stop,
    Zone,
    Shape,
    Block,
    Fare,
}

impl IdDomain {
    pub const ALL: [IdDomain; 8] = [
        IdDomain::Route,
        IdDomain::Service,
        IdDomain::Trip,
        IdDomain::Stop,
        IdDomain::Zone,
        IdDomain::Shape,
        IdDomain::Block,
        IdDomain::Fare,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IdDomain::Route => "route",
            IdDomain::Service => "service",
            IdDomain::Trip => "trip",
            IdDomain::Stop => "stop",
            IdDomain::Zone => "zone",
            IdDomain::Shape => "shape",
            IdDomain::Block => "block",
            IdDomain::Fare => "fare",
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Per-run mapping of natural keys to surrogate integers.
///
/// The registry lives for exactly one load run and is shared by every file of
/// that run: stop_times.txt resolves trip and stop keys first seen in
/// trips.txt and stops.txt. Surrogates are not stable across runs.
#[derive(Debug, Default)]
pub struct IdRegistry {
    maps: HashMap<IdDomain, HashMap<String, i64>>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the surrogate for `key`, assigning the next one on first sight.
    ///
    /// Returns 0 for an empty key without recording it.
    pub fn map_id(&mut self, domain: IdDomain, key: &str) -> i64 {
        if key.is_empty() {
            return 0;
        }

        let map = self.maps.entry(domain).or_default();
        if let Some(id) = map.get(key) {
            return *id;
        }

        let id = map.len() as i64 + 1;
        map.insert(key.to_string(), id);
        id
    }

    /// Surrogate for `key` if it has already been assigned
    pub fn get(&self, domain: IdDomain, key: &str) -> Option<i64> {
        self.maps.get(&domain).and_then(|map| map.get(key).copied())
    }

    /// Number of distinct keys mapped in `domain`
    pub fn len(&self, domain: IdDomain) -> usize {
        self.maps.get(&domain).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.maps.values().all(HashMap::is_empty)
    }

    /// Distinct keys per domain, in a stable order for logging and reports
    pub fn counts(&self) -> Vec<(IdDomain, usize)> {
        IdDomain::ALL
            .iter()
            .map(|domain| (*domain, self.len(*domain)))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

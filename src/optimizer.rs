// 🧮 Trip optimizer - derived columns computed from loaded stop_times
//
// Runs after a full load:
// 1. flag the last stop (highest stop_sequence) of every trip
// 2. copy first departure / last arrival of each trip onto trips
// 3. VACUUM + ANALYZE
//
// Both trip passes commit every `commit_every` trips.

use crate::db::Store;
use crate::entities::Value;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

pub const DEFAULT_COMMIT_EVERY: usize = 1000;

#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizeStats {
    pub trips: u64,
    /// stop_times rows flagged as last stop
    pub last_stops: u64,
    /// Trips that had at least one stop time
    pub timed_trips: u64,
}

pub struct TripOptimizer<'a> {
    store: &'a mut dyn Store,
    commit_every: usize,
}

impl<'a> TripOptimizer<'a> {
    pub fn new(store: &'a mut dyn Store) -> Self {
        TripOptimizer {
            store,
            commit_every: DEFAULT_COMMIT_EVERY,
        }
    }

    pub fn with_commit_every(mut self, commit_every: usize) -> Self {
        self.commit_every = commit_every.max(1);
        self
    }

    pub fn run(&mut self) -> Result<OptimizeStats> {
        let trips = self.trip_indexes()?;
        info!(trips = trips.len(), "Optimizing trips");

        let stats = OptimizeStats {
            trips: trips.len() as u64,
            last_stops: self.mark_last_stops(&trips)?,
            timed_trips: self.calculate_trip_times(&trips)?,
        };

        self.finalize()?;
        info!(
            trips = stats.trips,
            last_stops = stats.last_stops,
            timed_trips = stats.timed_trips,
            "Optimization done"
        );
        Ok(stats)
    }

    fn trip_indexes(&mut self) -> Result<Vec<i64>> {
        let rows = self
            .store
            .query("SELECT DISTINCT trip_index FROM trips ORDER BY trip_index", &[])?;
        Ok(rows.iter().filter_map(|row| row[0].as_i64()).collect())
    }

    pub fn mark_last_stops(&mut self, trips: &[i64]) -> Result<u64> {
        let p = self.store.placeholder(1);
        let sql = format!(
            "UPDATE stop_times SET last_stop = 1 WHERE trip_index = {p} AND stop_sequence = \
             (SELECT max(stop_sequence) FROM stop_times WHERE trip_index = {p})"
        );

        for_each_trip(self.store, trips, self.commit_every, "last stops", |store, trip| {
            store.execute_params(&sql, &[Value::Integer(trip)])
        })
    }

    pub fn calculate_trip_times(&mut self, trips: &[i64]) -> Result<u64> {
        let select = format!(
            "SELECT arrival_time, arrival_time_secs, departure_time, departure_time_secs \
             FROM stop_times WHERE trip_index = {} ORDER BY stop_sequence",
            self.store.placeholder(1)
        );
        let update = format!(
            "UPDATE trips SET departure_time = {}, departure_time_secs = {}, \
             arrival_time = {}, arrival_time_secs = {} WHERE trip_index = {}",
            self.store.placeholder(1),
            self.store.placeholder(2),
            self.store.placeholder(3),
            self.store.placeholder(4),
            self.store.placeholder(5),
        );

        for_each_trip(self.store, trips, self.commit_every, "trip times", |store, trip| {
            let stops = store.query(&select, &[Value::Integer(trip)])?;

            // first stop departs, last stop arrives
            let (departure, arrival) = match (stops.first(), stops.last()) {
                (Some(first), Some(last)) => (
                    (first[2].clone(), first[3].clone()),
                    (last[0].clone(), last[1].clone()),
                ),
                _ => ((Value::Null, Value::Null), (Value::Null, Value::Null)),
            };

            store.execute_params(
                &update,
                &[departure.0, departure.1, arrival.0, arrival.1, Value::Integer(trip)],
            )?;
            Ok(u64::from(!stops.is_empty()))
        })
    }

    /// Reclaim space and refresh planner statistics; must run outside a
    /// transaction
    pub fn finalize(&mut self) -> Result<()> {
        self.store.execute("VACUUM").context("VACUUM failed")?;
        self.store.execute("ANALYZE").context("ANALYZE failed")?;
        Ok(())
    }
}

/// Apply `op` to every trip, committing every `commit_every` trips.
/// Returns the sum of what `op` reports.
fn for_each_trip<F>(
    store: &mut dyn Store,
    trips: &[i64],
    commit_every: usize,
    label: &str,
    mut op: F,
) -> Result<u64>
where
    F: FnMut(&mut dyn Store, i64) -> Result<u64>,
{
    let mut total = 0;

    store.begin()?;
    for (n, trip) in trips.iter().enumerate() {
        match op(&mut *store, *trip) {
            Ok(count) => total += count,
            Err(e) => {
                let _ = store.rollback();
                return Err(e.context(format!("{} failed at trip_index {}", label, trip)));
            }
        }

        if (n + 1) % commit_every == 0 {
            store.commit()?;
            debug!(pass = label, done = n + 1, "Committed");
            store.begin()?;
        }
    }
    store.commit()?;

    info!(pass = label, trips = trips.len(), total, "Pass complete");
    Ok(total)
}

// ============================================================================
// TESTS
// ============================================================================

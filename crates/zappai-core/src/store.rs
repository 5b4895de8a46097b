//! Climate record repository.
//!
//! Grounded in `tesi/zappai/repositories/past_climate_data_repository.py`
//! (chunked save-with-overwrite, all-records and previous-12-months
//! queries) and `future_climate_data_repository.py` (nearest-coordinate
//! lookup via great-circle distance in place of PostGIS `ST_Distance`).
//! The DB-backed implementation is out of scope (spec §4.1); this trait is
//! the boundary a real repository would sit behind.

use std::collections::HashMap;

use uuid::Uuid;

use crate::calendar::YearMonth;
use crate::climate::{FutureClimateRecord, PastClimateRecord};
use crate::error::{Result, ZappaiError};
use crate::location::Location;

/// Repository boundary for monthly climate records, keyed by location.
pub trait ClimateStore {
    /// Atomically replaces any existing records in `chunk`'s month range for
    /// `location_id` with `chunk` (delete-then-insert, matching
    /// `__save_past_climate_data`'s per-chunk overwrite).
    fn save_past_chunk(&mut self, location_id: Uuid, chunk: Vec<PastClimateRecord>) -> Result<()>;

    fn save_future_chunk(&mut self, location_id: Uuid, chunk: Vec<FutureClimateRecord>) -> Result<()>;

    /// All past records for a location, in ascending calendar order.
    /// `NotFound` if the location has no records at all.
    fn get_past_climate_data(&self, location_id: Uuid) -> Result<Vec<PastClimateRecord>>;

    /// All future (projected) records for a location, in ascending order.
    fn get_future_climate_data(&self, location_id: Uuid) -> Result<Vec<FutureClimateRecord>>;

    /// The most recent `n` months of past data for a location, in
    /// ascending calendar order (`get_past_climate_data_of_previous_12_months`
    /// generalized to an arbitrary window).
    fn get_previous_months(&self, location_id: Uuid, n: usize) -> Result<Vec<PastClimateRecord>>;

    /// Past records for a location strictly within the closed calendar
    /// interval `[from, to]`, ascending by `(year, month)`. `NotFound` if the
    /// window contains no stored record.
    fn get_past_climate_data_in_range(
        &self,
        location_id: Uuid,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<PastClimateRecord>>;

    /// The most recent month on record for a location, if any.
    fn last_past_month(&self, location_id: Uuid) -> Option<YearMonth>;

    /// The future-climate location geographically nearest to `(longitude,
    /// latitude)`, breaking ties by insertion order
    /// (`get_future_climate_data_for_nearest_coordinates`).
    fn nearest_future_climate_location(&self, longitude: f64, latitude: f64) -> Option<Uuid>;

    /// The first month an incremental download should request for
    /// `location_id`: the month after whatever is already stored, or `None`
    /// if nothing is stored yet and the full history must be fetched
    /// (`download_new_past_climate_data`'s resume-from-last-month logic).
    fn next_chunk_start(&self, location_id: Uuid) -> Option<YearMonth> {
        self.last_past_month(location_id).map(YearMonth::next)
    }
}

/// Great-circle distance in kilometers (haversine), standing in for
/// PostGIS's `ST_Distance` over a `Geography` point.
fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// In-memory `ClimateStore`, suitable for the optimizer/generator pipeline
/// and for tests.
#[derive(Debug, Default)]
pub struct InMemoryClimateStore {
    past: HashMap<Uuid, Vec<PastClimateRecord>>,
    future: HashMap<Uuid, Vec<FutureClimateRecord>>,
    /// Insertion order of locations with future data, for deterministic
    /// nearest-neighbor tiebreaking.
    future_locations: Vec<Uuid>,
    locations: HashMap<Uuid, Location>,
}

impl InMemoryClimateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }
}

impl ClimateStore for InMemoryClimateStore {
    fn save_past_chunk(&mut self, location_id: Uuid, chunk: Vec<PastClimateRecord>) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        let months: std::collections::HashSet<YearMonth> =
            chunk.iter().map(|r| r.year_month).collect();
        let records = self.past.entry(location_id).or_default();
        records.retain(|r| !months.contains(&r.year_month));
        records.extend(chunk);
        records.sort_by_key(|r| r.year_month);
        Ok(())
    }

    fn save_future_chunk(&mut self, location_id: Uuid, chunk: Vec<FutureClimateRecord>) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        let months: std::collections::HashSet<YearMonth> =
            chunk.iter().map(|r| r.year_month).collect();
        if !self.future.contains_key(&location_id) {
            self.future_locations.push(location_id);
        }
        let records = self.future.entry(location_id).or_default();
        records.retain(|r| !months.contains(&r.year_month));
        records.extend(chunk);
        records.sort_by_key(|r| r.year_month);
        Ok(())
    }

    fn get_past_climate_data(&self, location_id: Uuid) -> Result<Vec<PastClimateRecord>> {
        self.past
            .get(&location_id)
            .filter(|records| !records.is_empty())
            .cloned()
            .ok_or(ZappaiError::PastClimateDataNotFound)
    }

    fn get_future_climate_data(&self, location_id: Uuid) -> Result<Vec<FutureClimateRecord>> {
        self.future
            .get(&location_id)
            .filter(|records| !records.is_empty())
            .cloned()
            .ok_or(ZappaiError::NotFound)
    }

    fn get_previous_months(&self, location_id: Uuid, n: usize) -> Result<Vec<PastClimateRecord>> {
        let records = self.get_past_climate_data(location_id)?;
        let start = records.len().saturating_sub(n);
        Ok(records[start..].to_vec())
    }

    fn get_past_climate_data_in_range(
        &self,
        location_id: Uuid,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<PastClimateRecord>> {
        let records = self.get_past_climate_data(location_id)?;
        let windowed: Vec<PastClimateRecord> = records
            .into_iter()
            .filter(|r| r.year_month >= from && r.year_month <= to)
            .collect();
        if windowed.is_empty() {
            return Err(ZappaiError::NotFound);
        }
        Ok(windowed)
    }

    fn last_past_month(&self, location_id: Uuid) -> Option<YearMonth> {
        self.past
            .get(&location_id)
            .and_then(|records| records.last())
            .map(|r| r.year_month)
    }

    fn nearest_future_climate_location(&self, longitude: f64, latitude: f64) -> Option<Uuid> {
        self.future_locations
            .iter()
            .filter_map(|id| {
                self.locations
                    .get(id)
                    .map(|loc| (*id, haversine_km(longitude, latitude, loc.longitude, loc.latitude)))
            })
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year_month: YearMonth) -> PastClimateRecord {
        PastClimateRecord {
            year_month,
            surface_net_solar_radiation: 0.0,
            surface_net_thermal_radiation: 0.0,
            snowfall: 0.0,
            total_cloud_cover: 0.0,
            dewpoint_temperature_2m: 0.0,
            soil_temperature_level_3: 0.0,
            volumetric_soil_water_layer_3: 0.0,
            wind_u_component_10m: 0.0,
            wind_v_component_10m: 0.0,
            temperature_2m: 0.0,
            evaporation: 0.0,
            total_precipitation: 0.0,
            surface_pressure: 0.0,
            surface_solar_radiation_downwards: 0.0,
            surface_thermal_radiation_downwards: 0.0,
        }
    }

    /// Spec §8 property 1: saving a chunk overwrites any existing records in
    /// its month range rather than duplicating them.
    #[test]
    fn saving_a_chunk_overwrites_overlapping_months() {
        let mut store = InMemoryClimateStore::new();
        let location_id = Uuid::new_v4();
        let mut first = record(YearMonth::new(2020, 1));
        first.temperature_2m = 1.0;
        store.save_past_chunk(location_id, vec![first]).unwrap();

        let mut overwritten = record(YearMonth::new(2020, 1));
        overwritten.temperature_2m = 99.0;
        store.save_past_chunk(location_id, vec![overwritten]).unwrap();

        let records = store.get_past_climate_data(location_id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].temperature_2m, 99.0);
    }

    /// Spec §8 property 2: a location with no records is reported as such,
    /// not as an empty collection.
    #[test]
    fn missing_location_is_not_found() {
        let store = InMemoryClimateStore::new();
        let err = store.get_past_climate_data(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ZappaiError::PastClimateDataNotFound));
    }

    #[test]
    fn previous_months_returns_the_tail_in_calendar_order() {
        let mut store = InMemoryClimateStore::new();
        let location_id = Uuid::new_v4();
        let chunk: Vec<_> = (1..=15).map(|m| record(YearMonth::new(2020, m))).collect();
        store.save_past_chunk(location_id, chunk).unwrap();

        let previous = store.get_previous_months(location_id, 12).unwrap();
        assert_eq!(previous.len(), 12);
        assert_eq!(previous.first().unwrap().year_month, YearMonth::new(2020, 4));
        assert_eq!(previous.last().unwrap().year_month, YearMonth::new(2021, 3));
    }

    #[test]
    fn next_chunk_start_resumes_after_the_last_stored_month() {
        let mut store = InMemoryClimateStore::new();
        let location_id = Uuid::new_v4();
        assert_eq!(store.next_chunk_start(location_id), None);

        store
            .save_past_chunk(location_id, vec![record(YearMonth::new(2020, 5))])
            .unwrap();
        assert_eq!(store.next_chunk_start(location_id), Some(YearMonth::new(2020, 6)));
    }

    /// Spec §8 property 2 / scenario S6: a ranged query returns only the
    /// months strictly inside `[from, to]`, ascending by `(year, month)`.
    #[test]
    fn range_query_returns_only_months_inside_the_closed_interval() {
        let mut store = InMemoryClimateStore::new();
        let location_id = Uuid::new_v4();
        let chunk: Vec<_> = (1..=6).map(|m| record(YearMonth::new(2020, m))).collect();
        store.save_past_chunk(location_id, chunk).unwrap();

        let windowed = store
            .get_past_climate_data_in_range(location_id, YearMonth::new(2020, 3), YearMonth::new(2020, 5))
            .unwrap();
        let months: Vec<_> = windowed.iter().map(|r| r.year_month).collect();
        assert_eq!(
            months,
            vec![YearMonth::new(2020, 3), YearMonth::new(2020, 4), YearMonth::new(2020, 5)]
        );
    }

    /// Spec §8 property 2: an interval with no stored record is `NotFound`,
    /// not an empty collection.
    #[test]
    fn range_query_with_no_matching_records_is_not_found() {
        let mut store = InMemoryClimateStore::new();
        let location_id = Uuid::new_v4();
        store
            .save_past_chunk(location_id, vec![record(YearMonth::new(2020, 1))])
            .unwrap();

        let err = store
            .get_past_climate_data_in_range(location_id, YearMonth::new(2021, 1), YearMonth::new(2021, 3))
            .unwrap_err();
        assert!(matches!(err, ZappaiError::NotFound));
    }

    /// Scenario S3 / S6: nearest-location lookup by great-circle distance.
    #[test]
    fn nearest_future_climate_location_picks_the_closest_point() {
        let mut store = InMemoryClimateStore::new();
        let near = Location::new("IT".into(), "Near".into(), 10.0, 45.0);
        let far = Location::new("IT".into(), "Far".into(), 50.0, 10.0);
        store.register_location(near.clone());
        store.register_location(far.clone());
        store
            .save_future_chunk(near.id, vec![FutureClimateRecord {
                year_month: YearMonth::new(2030, 1),
                wind_u_component_10m: 0.0,
                wind_v_component_10m: 0.0,
                temperature_2m: 0.0,
                evaporation: 0.0,
                total_precipitation: 0.0,
                surface_pressure: 0.0,
                surface_solar_radiation_downwards: 0.0,
                surface_thermal_radiation_downwards: 0.0,
            }])
            .unwrap();
        store
            .save_future_chunk(far.id, vec![FutureClimateRecord {
                year_month: YearMonth::new(2030, 1),
                wind_u_component_10m: 0.0,
                wind_v_component_10m: 0.0,
                temperature_2m: 0.0,
                evaporation: 0.0,
                total_precipitation: 0.0,
                surface_pressure: 0.0,
                surface_solar_radiation_downwards: 0.0,
                surface_thermal_radiation_downwards: 0.0,
            }])
            .unwrap();

        let nearest = store.nearest_future_climate_location(10.5, 45.5).unwrap();
        assert_eq!(nearest, near.id);
    }
}

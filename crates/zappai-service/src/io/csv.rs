//! CSV import/export for locations, past climate records, and crop yield
//! observations.
//!
//! Grounded in `tesi/scripts/export_locations.py`,
//! `export_past_climate_data.py`, and
//! `tesi/zappai/scripts/create_csvs_for_notebook.py`, which export these
//! same three tables for offline model training.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use zappai_core::{CropYieldObservation, Location, PastClimateRecord, YearMonth};

use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
struct LocationRow {
    id: uuid::Uuid,
    country: String,
    name: String,
    longitude: f64,
    latitude: f64,
}

pub fn write_locations<W: Write>(writer: W, locations: &[Location]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for location in locations {
        wtr.serialize(LocationRow {
            id: location.id,
            country: location.country.clone(),
            name: location.name.clone(),
            longitude: location.longitude,
            latitude: location.latitude,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_locations<R: Read>(reader: R) -> Result<Vec<Location>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut locations = Vec::new();
    for record in rdr.deserialize() {
        let row: LocationRow = record?;
        locations.push(Location::new(row.country, row.name, row.longitude, row.latitude));
    }
    Ok(locations)
}

#[derive(Debug, Serialize, Deserialize)]
struct PastClimateRow {
    location_id: uuid::Uuid,
    year: i32,
    month: u32,
    surface_net_solar_radiation: f64,
    surface_net_thermal_radiation: f64,
    snowfall: f64,
    total_cloud_cover: f64,
    dewpoint_temperature_2m: f64,
    soil_temperature_level_3: f64,
    volumetric_soil_water_layer_3: f64,
    wind_u_component_10m: f64,
    wind_v_component_10m: f64,
    temperature_2m: f64,
    evaporation: f64,
    total_precipitation: f64,
    surface_pressure: f64,
    surface_solar_radiation_downwards: f64,
    surface_thermal_radiation_downwards: f64,
}

pub fn write_past_climate_data<W: Write>(
    writer: W,
    location_id: uuid::Uuid,
    records: &[PastClimateRecord],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(PastClimateRow {
            location_id,
            year: r.year_month.year,
            month: r.year_month.month,
            surface_net_solar_radiation: r.surface_net_solar_radiation,
            surface_net_thermal_radiation: r.surface_net_thermal_radiation,
            snowfall: r.snowfall,
            total_cloud_cover: r.total_cloud_cover,
            dewpoint_temperature_2m: r.dewpoint_temperature_2m,
            soil_temperature_level_3: r.soil_temperature_level_3,
            volumetric_soil_water_layer_3: r.volumetric_soil_water_layer_3,
            wind_u_component_10m: r.wind_u_component_10m,
            wind_v_component_10m: r.wind_v_component_10m,
            temperature_2m: r.temperature_2m,
            evaporation: r.evaporation,
            total_precipitation: r.total_precipitation,
            surface_pressure: r.surface_pressure,
            surface_solar_radiation_downwards: r.surface_solar_radiation_downwards,
            surface_thermal_radiation_downwards: r.surface_thermal_radiation_downwards,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_past_climate_data<R: Read>(reader: R) -> Result<Vec<(uuid::Uuid, PastClimateRecord)>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let row: PastClimateRow = row?;
        records.push((
            row.location_id,
            PastClimateRecord {
                year_month: YearMonth::new(row.year, row.month),
                surface_net_solar_radiation: row.surface_net_solar_radiation,
                surface_net_thermal_radiation: row.surface_net_thermal_radiation,
                snowfall: row.snowfall,
                total_cloud_cover: row.total_cloud_cover,
                dewpoint_temperature_2m: row.dewpoint_temperature_2m,
                soil_temperature_level_3: row.soil_temperature_level_3,
                volumetric_soil_water_layer_3: row.volumetric_soil_water_layer_3,
                wind_u_component_10m: row.wind_u_component_10m,
                wind_v_component_10m: row.wind_v_component_10m,
                temperature_2m: row.temperature_2m,
                evaporation: row.evaporation,
                total_precipitation: row.total_precipitation,
                surface_pressure: row.surface_pressure,
                surface_solar_radiation_downwards: row.surface_solar_radiation_downwards,
                surface_thermal_radiation_downwards: row.surface_thermal_radiation_downwards,
            },
        ));
    }
    Ok(records)
}

#[derive(Debug, Serialize, Deserialize)]
struct CropYieldRow {
    location_id: uuid::Uuid,
    crop_id: uuid::Uuid,
    sowing_year: i32,
    sowing_month: u32,
    harvest_year: i32,
    harvest_month: u32,
    yield_per_hectare: f64,
    is_outlier: bool,
}

pub fn write_crop_yield_data<W: Write>(writer: W, observations: &[CropYieldObservation]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for obs in observations {
        wtr.serialize(CropYieldRow {
            location_id: obs.location_id,
            crop_id: obs.crop_id,
            sowing_year: obs.sowing.year,
            sowing_month: obs.sowing.month,
            harvest_year: obs.harvest.year,
            harvest_month: obs.harvest.month,
            yield_per_hectare: obs.yield_per_hectare,
            is_outlier: obs.is_outlier,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_crop_yield_data<R: Read>(reader: R) -> Result<Vec<CropYieldObservation>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut observations = Vec::new();
    for row in rdr.deserialize() {
        let row: CropYieldRow = row?;
        observations.push(CropYieldObservation {
            location_id: row.location_id,
            crop_id: row.crop_id,
            sowing: YearMonth::new(row.sowing_year, row.sowing_month),
            harvest: YearMonth::new(row.harvest_year, row.harvest_month),
            yield_per_hectare: row.yield_per_hectare,
            is_outlier: row.is_outlier,
        });
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_roundtrip_through_csv() {
        let locations = vec![
            Location::new("IT".to_string(), "Bologna".to_string(), 11.34, 44.49),
            Location::new("FR".to_string(), "Paris".to_string(), 2.35, 48.85),
        ];
        let mut buffer = Vec::new();
        write_locations(&mut buffer, &locations).unwrap();
        let read_back = read_locations(buffer.as_slice()).unwrap();
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[0].name, "Bologna");
        assert_eq!(read_back[1].country, "FR");
    }

    #[test]
    fn crop_yield_data_roundtrip_through_csv() {
        let observations = vec![CropYieldObservation {
            location_id: uuid::Uuid::new_v4(),
            crop_id: uuid::Uuid::new_v4(),
            sowing: YearMonth::new(2019, 3),
            harvest: YearMonth::new(2019, 9),
            yield_per_hectare: 4.2,
            is_outlier: false,
        }];
        let mut buffer = Vec::new();
        write_crop_yield_data(&mut buffer, &observations).unwrap();
        let read_back = read_crop_yield_data(buffer.as_slice()).unwrap();
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].yield_per_hectare, 4.2);
        assert_eq!(read_back[0].harvest, YearMonth::new(2019, 9));
    }
}

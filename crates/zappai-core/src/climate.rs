//! Climate variable catalogue and the two record shapes the store holds.
//!
//! Variable names and the ERA5/CMIP overlap split are grounded in
//! `tesi/zappai/repositories/copernicus_data_store_api.py`
//! (`ERA5_VARIABLES`, `CMIP5_VARIABLES`, `ERA5_EXCLUSIVE_VARIABLES`).
//! CMIP5's `mean_precipitation_flux` is converted to `total_precipitation`
//! before storage, which is why both series share that name here.

use crate::calendar::YearMonth;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Variables present in both the reanalysis (ERA5) and projection (CMIP5)
/// series, in the fixed order the feature vector uses them.
pub const CMIP_OVERLAP_VARIABLES: [&str; 8] = [
    "10m_u_component_of_wind",
    "10m_v_component_of_wind",
    "2m_temperature",
    "evaporation",
    "total_precipitation",
    "surface_pressure",
    "surface_solar_radiation_downwards",
    "surface_thermal_radiation_downwards",
];

/// Variables present only in the reanalysis series; these are the climate
/// generator's prediction targets `T` (spec §4.2).
pub const ERA5_EXCLUSIVE_VARIABLES: [&str; 7] = [
    "surface_net_solar_radiation",
    "surface_net_thermal_radiation",
    "snowfall",
    "total_cloud_cover",
    "2m_dewpoint_temperature",
    "soil_temperature_level_3",
    "volumetric_soil_water_layer_3",
];

/// One month of observed (ERA5 reanalysis) climate data for a location.
/// Field order matches [`ERA5_EXCLUSIVE_VARIABLES`] followed by
/// [`CMIP_OVERLAP_VARIABLES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PastClimateRecord {
    pub year_month: YearMonth,
    pub surface_net_solar_radiation: f64,
    pub surface_net_thermal_radiation: f64,
    pub snowfall: f64,
    pub total_cloud_cover: f64,
    pub dewpoint_temperature_2m: f64,
    pub soil_temperature_level_3: f64,
    pub volumetric_soil_water_layer_3: f64,
    pub wind_u_component_10m: f64,
    pub wind_v_component_10m: f64,
    pub temperature_2m: f64,
    pub evaporation: f64,
    pub total_precipitation: f64,
    pub surface_pressure: f64,
    pub surface_solar_radiation_downwards: f64,
    pub surface_thermal_radiation_downwards: f64,
}

impl PastClimateRecord {
    /// `T` (ERA5-exclusive) values, in [`ERA5_EXCLUSIVE_VARIABLES`] order.
    pub fn era5_exclusive_values(&self) -> [f64; 7] {
        [
            self.surface_net_solar_radiation,
            self.surface_net_thermal_radiation,
            self.snowfall,
            self.total_cloud_cover,
            self.dewpoint_temperature_2m,
            self.soil_temperature_level_3,
            self.volumetric_soil_water_layer_3,
        ]
    }

    /// CMIP-overlap values, in [`CMIP_OVERLAP_VARIABLES`] order.
    pub fn cmip_overlap_values(&self) -> [f64; 8] {
        [
            self.wind_u_component_10m,
            self.wind_v_component_10m,
            self.temperature_2m,
            self.evaporation,
            self.total_precipitation,
            self.surface_pressure,
            self.surface_solar_radiation_downwards,
            self.surface_thermal_radiation_downwards,
        ]
    }
}

/// One month of projected (CMIP5) climate data for a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FutureClimateRecord {
    pub year_month: YearMonth,
    pub wind_u_component_10m: f64,
    pub wind_v_component_10m: f64,
    pub temperature_2m: f64,
    pub evaporation: f64,
    pub total_precipitation: f64,
    pub surface_pressure: f64,
    pub surface_solar_radiation_downwards: f64,
    pub surface_thermal_radiation_downwards: f64,
}

impl FutureClimateRecord {
    /// CMIP-overlap values, in [`CMIP_OVERLAP_VARIABLES`] order.
    pub fn cmip_overlap_values(&self) -> [f64; 8] {
        [
            self.wind_u_component_10m,
            self.wind_v_component_10m,
            self.temperature_2m,
            self.evaporation,
            self.total_precipitation,
            self.surface_pressure,
            self.surface_solar_radiation_downwards,
            self.surface_thermal_radiation_downwards,
        ]
    }
}

/// Opaque reference to a soil classification, resolved independently of
/// climate data (spec §3 supplement: `Location::soil_type_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilTypeId(pub Uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn era5_exclusive_values_follow_declared_order() {
        let record = PastClimateRecord {
            year_month: YearMonth::new(2020, 1),
            surface_net_solar_radiation: 1.0,
            surface_net_thermal_radiation: 2.0,
            snowfall: 3.0,
            total_cloud_cover: 4.0,
            dewpoint_temperature_2m: 5.0,
            soil_temperature_level_3: 6.0,
            volumetric_soil_water_layer_3: 7.0,
            wind_u_component_10m: 8.0,
            wind_v_component_10m: 9.0,
            temperature_2m: 10.0,
            evaporation: 11.0,
            total_precipitation: 12.0,
            surface_pressure: 13.0,
            surface_solar_radiation_downwards: 14.0,
            surface_thermal_radiation_downwards: 15.0,
        };
        assert_eq!(
            record.era5_exclusive_values(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
        assert_eq!(
            record.cmip_overlap_values(),
            [8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0]
        );
    }
}

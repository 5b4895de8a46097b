//! Feature-vector assembly for the climate generator and crop-yield regressor.
//!
//! Grounded in `tesi/zappai/repositories/climate_generative_model_repository.py`
//! (`get_features`, `get_target`, `get_cmip5_columns`, `__add_sin_cos_year`)
//! and `crop_yield_model_repository.py` (`FEATURES`, its stats-dataframe loop).

use crate::calendar::YearMonth;
use crate::climate::{
    FutureClimateRecord, PastClimateRecord, CMIP_OVERLAP_VARIABLES, ERA5_EXCLUSIVE_VARIABLES,
};
use crate::crop::CropYieldObservation;
use crate::error::{Result, ZappaiError};
use crate::stats::compute_window_stats;

/// Width of the climate generator's per-month feature vector `F`:
/// `T` (7 ERA5-exclusive targets) + sin/cos year + 8 CMIP-overlap variables.
pub const CLIMATE_FEATURE_WIDTH: usize = ERA5_EXCLUSIVE_VARIABLES.len() + 2 + CMIP_OVERLAP_VARIABLES.len();

/// Width of the climate generator's prediction target `T`.
pub const CLIMATE_TARGET_WIDTH: usize = ERA5_EXCLUSIVE_VARIABLES.len();

/// Names of `F`, in the exact order [`climate_feature_vector`] produces them.
pub fn climate_feature_names() -> Vec<String> {
    let mut names: Vec<String> = ERA5_EXCLUSIVE_VARIABLES.iter().map(|s| s.to_string()).collect();
    names.push("sin_year".to_string());
    names.push("cos_year".to_string());
    names.extend(CMIP_OVERLAP_VARIABLES.iter().map(|s| s.to_string()));
    names
}

/// `F` for one observed month: `[*T, sin_year, cos_year, *CMIP-overlap]`
/// (`get_features` in the prototype).
pub fn climate_feature_vector(record: &PastClimateRecord) -> [f64; CLIMATE_FEATURE_WIDTH] {
    let mut out = [0.0; CLIMATE_FEATURE_WIDTH];
    let target = record.era5_exclusive_values();
    out[..CLIMATE_TARGET_WIDTH].copy_from_slice(&target);
    let (sin, cos) = record.year_month.cyclic_encoding();
    out[CLIMATE_TARGET_WIDTH] = sin;
    out[CLIMATE_TARGET_WIDTH + 1] = cos;
    out[CLIMATE_TARGET_WIDTH + 2..].copy_from_slice(&record.cmip_overlap_values());
    out
}

/// `T` for one observed month, the climate generator's regression target.
pub fn climate_target_vector(record: &PastClimateRecord) -> [f64; CLIMATE_TARGET_WIDTH] {
    record.era5_exclusive_values()
}

/// Reassembles a predicted `T` plus a known future `F_cmip` row back into a
/// full `F` vector, mirroring `generate_data_from_seed`'s
/// `np.concatenate([prediction, row.to_numpy()])` step.
pub fn recombine_prediction_with_future(
    predicted_target: &[f64; CLIMATE_TARGET_WIDTH],
    future: &FutureClimateRecord,
) -> [f64; CLIMATE_FEATURE_WIDTH] {
    let mut out = [0.0; CLIMATE_FEATURE_WIDTH];
    out[..CLIMATE_TARGET_WIDTH].copy_from_slice(predicted_target);
    let (sin, cos) = future.year_month.cyclic_encoding();
    out[CLIMATE_TARGET_WIDTH] = sin;
    out[CLIMATE_TARGET_WIDTH + 1] = cos;
    out[CLIMATE_TARGET_WIDTH + 2..].copy_from_slice(&future.cmip_overlap_values());
    out
}

/// `F_gen`: the variables the crop-yield regressor's window statistics are
/// computed over. Resolves the prototype's ambiguity between its two
/// overlapping feature lists (spec §9) by excluding the cyclic encoding,
/// since sin/cos carry no distributional information across a window.
pub fn regressor_window_variables() -> Vec<&'static str> {
    ERA5_EXCLUSIVE_VARIABLES
        .iter()
        .chain(CMIP_OVERLAP_VARIABLES.iter())
        .copied()
        .collect()
}

fn variable_value(record: &PastClimateRecord, variable: &str) -> f64 {
    let target = record.era5_exclusive_values();
    if let Some(i) = ERA5_EXCLUSIVE_VARIABLES.iter().position(|v| *v == variable) {
        return target[i];
    }
    let overlap = record.cmip_overlap_values();
    let i = CMIP_OVERLAP_VARIABLES
        .iter()
        .position(|v| *v == variable)
        .expect("variable must be ERA5-exclusive or CMIP-overlap");
    overlap[i]
}

/// Number of feature columns [`regressor_feature_row`] produces: 5
/// date/duration fields plus `mean/std/min/max` for each of
/// [`regressor_window_variables`].
pub fn regressor_feature_width() -> usize {
    5 + regressor_window_variables().len() * 4
}

/// Builds one training row for the crop-yield regressor: sowing/harvest
/// year and month, the growing season's duration in months, followed by
/// `mean/std/min/max` of each `F_gen` variable over the records spanning the
/// growing season (spec §4.3).
pub fn regressor_feature_row(
    observation: &CropYieldObservation,
    season_records: &[PastClimateRecord],
) -> Result<Vec<f64>> {
    if season_records.is_empty() {
        return Err(ZappaiError::InvalidInput(
            "cannot build a regressor feature row with no climate records".to_string(),
        ));
    }
    let mut row = vec![
        observation.sowing.year as f64,
        observation.sowing.month as f64,
        observation.harvest.year as f64,
        observation.harvest.month as f64,
        observation.duration_months() as f64,
    ];
    for variable in regressor_window_variables() {
        let values: Vec<f64> = season_records
            .iter()
            .map(|r| variable_value(r, variable))
            .collect();
        let stats = compute_window_stats(&values)?;
        row.extend_from_slice(&stats.as_array());
    }
    Ok(row)
}

/// Selects the contiguous run of monthly records from `sowing` to `harvest`
/// inclusive, in calendar order, failing if any month is missing.
pub fn select_growing_season<'a>(
    records: &'a [PastClimateRecord],
    sowing: YearMonth,
    harvest: YearMonth,
) -> Result<Vec<&'a PastClimateRecord>> {
    let expected_months = sowing.months_until(harvest) + 1;
    if expected_months <= 0 {
        return Err(ZappaiError::InvalidInput(
            "harvest must not precede sowing".to_string(),
        ));
    }
    let mut result = Vec::with_capacity(expected_months as usize);
    let mut month = sowing;
    loop {
        let record = records
            .iter()
            .find(|r| r.year_month == month)
            .ok_or(ZappaiError::PastClimateDataNotFound)?;
        result.push(record);
        if month == harvest {
            break;
        }
        month = month.next();
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(year_month: YearMonth, seed: f64) -> PastClimateRecord {
        PastClimateRecord {
            year_month,
            surface_net_solar_radiation: seed,
            surface_net_thermal_radiation: seed + 1.0,
            snowfall: seed + 2.0,
            total_cloud_cover: seed + 3.0,
            dewpoint_temperature_2m: seed + 4.0,
            soil_temperature_level_3: seed + 5.0,
            volumetric_soil_water_layer_3: seed + 6.0,
            wind_u_component_10m: seed + 7.0,
            wind_v_component_10m: seed + 8.0,
            temperature_2m: seed + 9.0,
            evaporation: seed + 10.0,
            total_precipitation: seed + 11.0,
            surface_pressure: seed + 12.0,
            surface_solar_radiation_downwards: seed + 13.0,
            surface_thermal_radiation_downwards: seed + 14.0,
        }
    }

    #[test]
    fn climate_feature_vector_places_target_then_cyclic_then_cmip() {
        let record = sample_record(YearMonth::new(2020, 4), 0.0);
        let features = climate_feature_vector(&record);
        assert_eq!(&features[0..7], &record.era5_exclusive_values());
        let (sin, cos) = record.year_month.cyclic_encoding();
        assert_eq!(features[7], sin);
        assert_eq!(features[8], cos);
        assert_eq!(&features[9..17], &record.cmip_overlap_values());
    }

    #[test]
    fn regressor_feature_width_matches_date_fields_plus_stats() {
        assert_eq!(regressor_feature_width(), 5 + 15 * 4);
    }

    #[test]
    fn select_growing_season_requires_contiguous_months() {
        let records = vec![
            sample_record(YearMonth::new(2020, 1), 1.0),
            sample_record(YearMonth::new(2020, 3), 3.0),
        ];
        let result = select_growing_season(&records, YearMonth::new(2020, 1), YearMonth::new(2020, 3));
        assert!(result.is_err());
    }

    #[test]
    fn regressor_feature_row_has_expected_width() {
        let obs = CropYieldObservation {
            location_id: uuid::Uuid::nil(),
            crop_id: uuid::Uuid::nil(),
            sowing: YearMonth::new(2020, 1),
            harvest: YearMonth::new(2020, 3),
            yield_per_hectare: 3.0,
            is_outlier: false,
        };
        let season = vec![
            sample_record(YearMonth::new(2020, 1), 1.0),
            sample_record(YearMonth::new(2020, 2), 2.0),
            sample_record(YearMonth::new(2020, 3), 3.0),
        ];
        let row = regressor_feature_row(&obs, &season).unwrap();
        assert_eq!(row.len(), regressor_feature_width());
    }
}

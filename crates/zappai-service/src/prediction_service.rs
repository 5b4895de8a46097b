//! Planting window recommendation: ties the trained climate generator, the
//! crop-yield regressor, and the genetic-algorithm search together.
//!
//! Grounded in `crop_optimizer_service.py`'s intent (a best candidate is
//! searched for by feeding candidate windows to a trained yield model) and
//! `optimizer::planting` for the search itself. Per spec §4.4, the search
//! never reaches past the current forecast horizon: a fresh rollout is
//! generated from the most recent stored months, and the genetic search
//! ranges over indices into that rollout rather than calendar dates.

use std::sync::Arc;

use uuid::Uuid;
use zappai_core::optimizer::planting::{self, PlantingCandidate, DEFAULT_HORIZON};
use zappai_core::{
    ClimateGenerativeModel, ClimateStore, Crop, CropYieldRegressor, PastClimateRecord, YearMonth,
    ZappaiError, SEQUENCE_LENGTH,
};

use crate::error::Result;
use crate::state::AppState;

#[derive(Clone)]
pub struct PredictionService {
    state: Arc<AppState>,
}

/// One recommended planting window and the yield the regressor expects from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantingRecommendation {
    pub sowing: YearMonth,
    pub harvest: YearMonth,
    pub predicted_yield_per_hectare: f64,
}

impl PredictionService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Generates a `horizon`-month forecast for `location_id` and searches it
    /// for the top `top_k` sowing/harvest windows maximizing `crop_id`'s
    /// predicted yield, restricted to the crop's allowed farming duration.
    /// Returns the recommendations alongside the forecast they were scored
    /// against (spec §6: `GET /prediction` returns both).
    pub async fn recommend_planting_windows(
        &self,
        crop_id: Uuid,
        location_id: Uuid,
        seed: u64,
        top_k: usize,
    ) -> Result<(Vec<PlantingRecommendation>, Vec<PastClimateRecord>)> {
        self.recommend_planting_windows_with_horizon(crop_id, location_id, seed, top_k, DEFAULT_HORIZON)
            .await
    }

    /// Thin alias over [`Self::recommend_planting_windows`] matching the
    /// facade's named surface (spec §6 `get_prediction`, `GET /prediction`).
    pub async fn get_prediction(
        &self,
        crop_id: Uuid,
        location_id: Uuid,
        seed: u64,
        top_k: usize,
    ) -> Result<(Vec<PlantingRecommendation>, Vec<PastClimateRecord>)> {
        self.recommend_planting_windows(crop_id, location_id, seed, top_k).await
    }

    pub async fn recommend_planting_windows_with_horizon(
        &self,
        crop_id: Uuid,
        location_id: Uuid,
        seed: u64,
        top_k: usize,
        horizon: usize,
    ) -> Result<(Vec<PlantingRecommendation>, Vec<PastClimateRecord>)> {
        let crop: Crop = self
            .state
            .crops
            .lock()
            .await
            .get(&crop_id)
            .cloned()
            .ok_or(ZappaiError::CropNotFound)?;
        let regressor: Arc<CropYieldRegressor> = self
            .state
            .yield_models
            .lock()
            .await
            .get(&crop_id)
            .cloned()
            .ok_or(ZappaiError::CropYieldModelNotFound)?;
        let generator: Arc<ClimateGenerativeModel> = self
            .state
            .generative_models
            .lock()
            .await
            .get(&location_id)
            .cloned()
            .ok_or(ZappaiError::ClimateGenerativeModelNotFound)?;

        let (past, future) = {
            let store = self.state.climate_store.lock().await;
            let past = store.get_past_climate_data(location_id)?;
            let future = store.get_future_climate_data(location_id).unwrap_or_default();
            (past, future)
        };
        if past.len() < SEQUENCE_LENGTH {
            return Err(ZappaiError::InsufficientHistory {
                needed: SEQUENCE_LENGTH,
                got: past.len(),
            }
            .into());
        }
        let seed_start = past.len() - SEQUENCE_LENGTH;
        let seed_records = past[seed_start..].to_vec();

        let forecast = tokio::task::spawn_blocking(move || generator.generate(&seed_records, &future, horizon))
            .await??;

        let top = {
            let forecast = forecast.clone();
            tokio::task::spawn_blocking(move || {
                planting::optimize_planting_window(&crop, &forecast, &regressor, seed, top_k)
            })
            .await?
        };

        let recommendations = top
            .into_iter()
            .filter(|(_, fitness)| *fitness > 0.0)
            .map(|(candidate, fitness)| to_recommendation(&forecast, candidate, fitness))
            .collect();
        Ok((recommendations, forecast))
    }
}

fn to_recommendation(
    forecast: &[PastClimateRecord],
    candidate: PlantingCandidate,
    fitness: f64,
) -> PlantingRecommendation {
    PlantingRecommendation {
        sowing: forecast[candidate.sowing_index].year_month,
        harvest: forecast[candidate.harvest_index].year_month,
        predicted_yield_per_hectare: fitness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast_records(start: YearMonth, n: usize) -> Vec<PastClimateRecord> {
        (0..n)
            .map(|i| PastClimateRecord {
                year_month: start.add_months(i as i64),
                surface_net_solar_radiation: 1.0,
                surface_net_thermal_radiation: 1.0,
                snowfall: 1.0,
                total_cloud_cover: 1.0,
                dewpoint_temperature_2m: 1.0,
                soil_temperature_level_3: 1.0,
                volumetric_soil_water_layer_3: 1.0,
                wind_u_component_10m: 1.0,
                wind_v_component_10m: 1.0,
                temperature_2m: 1.0,
                evaporation: 1.0,
                total_precipitation: 1.0,
                surface_pressure: 1.0,
                surface_solar_radiation_downwards: 1.0,
                surface_thermal_radiation_downwards: 1.0,
            })
            .collect()
    }

    #[test]
    fn to_recommendation_resolves_indices_into_calendar_months() {
        let forecast = forecast_records(YearMonth::new(2024, 1), 12);
        let candidate = PlantingCandidate {
            sowing_index: 2,
            harvest_index: 7,
        };
        let recommendation = to_recommendation(&forecast, candidate, 4.5);
        assert_eq!(recommendation.sowing, YearMonth::new(2024, 3));
        assert_eq!(recommendation.harvest, YearMonth::new(2024, 8));
        assert_eq!(recommendation.predicted_yield_per_hectare, 4.5);
    }
}

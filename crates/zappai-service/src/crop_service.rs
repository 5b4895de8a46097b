//! Crop catalogue, yield observations, and the crop-yield regressor lifecycle.
//!
//! Grounded in `tesi/zappai/repositories/crop_repository.py` (crop CRUD) and
//! `crop_yield_model_repository.py` (assembling training rows from stored
//! climate data and fitting the regressor). Training is CPU-bound, so it
//! runs on `spawn_blocking`.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use zappai_core::{
    features, ClimateStore, Crop, CropYieldObservation, CropYieldRegressor, Location, ZappaiError,
};

use crate::error::Result;
use crate::state::AppState;

#[derive(Clone)]
pub struct CropService {
    state: Arc<AppState>,
}

impl CropService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn create_crop(
        &self,
        name: String,
        min_farming_months: u32,
        max_farming_months: u32,
    ) -> Result<Crop> {
        let crop = Crop::new(name, min_farming_months, max_farming_months);
        info!(crop_id = %crop.id, name = %crop.name, "registering crop");
        self.state.crops.lock().await.insert(crop.id, crop.clone());
        Ok(crop)
    }

    pub async fn get_crop(&self, crop_id: Uuid) -> Result<Crop> {
        self.state
            .crops
            .lock()
            .await
            .get(&crop_id)
            .cloned()
            .ok_or(ZappaiError::CropNotFound.into())
    }

    pub async fn list_crops(&self) -> Vec<Crop> {
        self.state.crops.lock().await.values().cloned().collect()
    }

    /// Records one sowing/harvest yield observation (`CropYieldDataRepository.save`).
    pub async fn add_yield_observation(&self, observation: CropYieldObservation) -> Result<()> {
        self.state.yield_observations.lock().await.push(observation);
        Ok(())
    }

    /// Trains a crop-yield regressor from every stored observation for
    /// `crop_id`, building each training row from the location's stored
    /// past climate data over the observation's growing season.
    pub async fn train_yield_model(&self, crop_id: Uuid) -> Result<Arc<CropYieldRegressor>> {
        let observations: Vec<CropYieldObservation> = self
            .state
            .yield_observations
            .lock()
            .await
            .iter()
            .filter(|o| o.crop_id == crop_id)
            .copied()
            .collect();
        if observations.is_empty() {
            return Err(ZappaiError::CropYieldDataNotFound.into());
        }

        let mut rows = Vec::with_capacity(observations.len());
        {
            let store = self.state.climate_store.lock().await;
            for observation in &observations {
                let records = store.get_past_climate_data(observation.location_id)?;
                let season = features::select_growing_season(
                    &records,
                    observation.sowing,
                    observation.harvest,
                )?;
                let season: Vec<_> = season.into_iter().copied().collect();
                let row = features::regressor_feature_row(observation, &season)?;
                rows.push((*observation, row));
            }
        }

        let model = tokio::task::spawn_blocking(move || CropYieldRegressor::train(rows)).await??;
        let model = Arc::new(model);
        self.state.yield_models.lock().await.insert(crop_id, model.clone());
        Ok(model)
    }

    pub async fn get_yield_model(&self, crop_id: Uuid) -> Result<Arc<CropYieldRegressor>> {
        self.state
            .yield_models
            .lock()
            .await
            .get(&crop_id)
            .cloned()
            .ok_or(ZappaiError::CropYieldModelNotFound.into())
    }

    pub async fn get_location(&self, location_id: Uuid) -> Result<Location> {
        self.state
            .locations
            .lock()
            .await
            .get(&location_id)
            .cloned()
            .ok_or(ZappaiError::LocationNotFound.into())
    }
}

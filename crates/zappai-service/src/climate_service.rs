//! Climate data ingestion and the generative model lifecycle.
//!
//! Grounded in `past_climate_data_repository.py`/`future_climate_data_repository.py`
//! (chunked download-and-save) and `climate_generative_model_repository.py`
//! (train/generate). Training and rollout are CPU-bound, so they run on
//! `spawn_blocking` rather than the async executor.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;
use zappai_core::{ClimateGenerativeModel, ClimateStore, FutureClimateRecord, PastClimateRecord, YearMonth};

use crate::error::Result;
use crate::retry::retry_on_error;
use crate::sources::ClimateDataSource;
use crate::state::AppState;

const MAX_DOWNLOAD_RETRIES: usize = 3;
const RETRY_WAIT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ClimateService {
    state: Arc<AppState>,
}

impl ClimateService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Downloads and saves any past climate data newer than what is already
    /// stored for `location_id`, serialized per location.
    pub async fn sync_past_climate_data(
        &self,
        location_id: Uuid,
        source: &dyn ClimateDataSource,
    ) -> Result<()> {
        let lock = self.state.ingest_lock(location_id).await;
        let _guard = lock.lock().await;

        let since = {
            let store = self.state.climate_store.lock().await;
            store.last_past_month(location_id)
        };

        let chunks: Vec<Vec<PastClimateRecord>> =
            retry_on_error(MAX_DOWNLOAD_RETRIES, RETRY_WAIT, || async {
                let mut chunks = Vec::new();
                source
                    .download_past_climate_data(location_id, since, &mut |chunk| chunks.push(chunk))
                    .await?;
                Ok(chunks)
            })
            .await?;

        let mut store = self.state.climate_store.lock().await;
        for chunk in chunks {
            info!(location_id = %location_id, months = chunk.len(), "saving past climate chunk");
            store.save_past_chunk(location_id, chunk)?;
        }
        Ok(())
    }

    pub async fn sync_future_climate_data(
        &self,
        location_id: Uuid,
        source: &dyn ClimateDataSource,
    ) -> Result<()> {
        let lock = self.state.ingest_lock(location_id).await;
        let _guard = lock.lock().await;

        let chunks: Vec<Vec<FutureClimateRecord>> =
            retry_on_error(MAX_DOWNLOAD_RETRIES, RETRY_WAIT, || async {
                let mut chunks = Vec::new();
                source
                    .download_future_climate_data(location_id, &mut |chunk| chunks.push(chunk))
                    .await?;
                Ok(chunks)
            })
            .await?;

        let mut store = self.state.climate_store.lock().await;
        for chunk in chunks {
            store.save_future_chunk(location_id, chunk)?;
        }
        Ok(())
    }

    /// Trains a fresh generative model for `location_id` from its stored
    /// past climate data and caches it.
    pub async fn train_generative_model(&self, location_id: Uuid) -> Result<Arc<ClimateGenerativeModel>> {
        let records = {
            let store = self.state.climate_store.lock().await;
            store.get_past_climate_data(location_id)?
        };
        let model = tokio::task::spawn_blocking(move || ClimateGenerativeModel::train(&records))
            .await??;
        let model = Arc::new(model);
        self.state
            .generative_models
            .lock()
            .await
            .insert(location_id, model.clone());
        Ok(model)
    }

    pub async fn get_generative_model(&self, location_id: Uuid) -> Result<Arc<ClimateGenerativeModel>> {
        self.state
            .generative_models
            .lock()
            .await
            .get(&location_id)
            .cloned()
            .ok_or(zappai_core::ZappaiError::ClimateGenerativeModelNotFound.into())
    }

    /// Generates `n` months of climate data after the most recent stored
    /// month for `location_id`, using stored future (CMIP) data.
    pub async fn generate_future_climate(
        &self,
        location_id: Uuid,
        n: usize,
    ) -> Result<Vec<PastClimateRecord>> {
        let model = self.get_generative_model(location_id).await?;
        let (seed, future) = {
            let store = self.state.climate_store.lock().await;
            let past = store.get_past_climate_data(location_id)?;
            let seed_start = past.len().saturating_sub(zappai_core::SEQUENCE_LENGTH);
            let seed: Vec<PastClimateRecord> = past[seed_start..].to_vec();
            let future = store.get_future_climate_data(location_id)?;
            (seed, future)
        };
        let generated = tokio::task::spawn_blocking(move || model.generate(&seed, &future, n)).await??;
        Ok(generated)
    }

    pub async fn last_past_month(&self, location_id: Uuid) -> Option<YearMonth> {
        self.state.climate_store.lock().await.last_past_month(location_id)
    }

    /// Kicks off a download-then-retrain cycle for `location_id` in the
    /// background and returns immediately; callers poll
    /// [`Self::is_climate_generative_model_ready`] or fetch the result via
    /// [`Self::get_generative_model`] once it lands (spec §6
    /// `ingest_past_climate_data`).
    pub fn ingest_past_climate_data(&self, location_id: Uuid, source: Arc<dyn ClimateDataSource>) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(err) = service.sync_past_climate_data(location_id, source.as_ref()).await {
                error!(location_id = %location_id, error = %err, "background climate ingestion failed");
                return;
            }
            if let Err(err) = service.train_generative_model(location_id).await {
                error!(location_id = %location_id, error = %err, "background generative model training failed");
            }
        });
    }

    /// Whether a trained generative model is cached for `location_id`
    /// (spec §6 `is_climate_generative_model_ready`).
    pub async fn is_climate_generative_model_ready(&self, location_id: Uuid) -> bool {
        self.state.generative_models.lock().await.contains_key(&location_id)
    }
}

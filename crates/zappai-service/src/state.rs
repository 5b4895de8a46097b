//! Shared in-memory application state the service facade types compose
//! over. A persistence layer is out of scope (spec §4.1/§6); this is the
//! seam a database-backed repository set would replace.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;
use zappai_core::{
    ClimateGenerativeModel, Crop, CropYieldObservation, CropYieldRegressor, InMemoryClimateStore,
    Location,
};

#[derive(Default)]
pub struct AppState {
    pub climate_store: Mutex<InMemoryClimateStore>,
    pub locations: Mutex<HashMap<Uuid, Location>>,
    pub crops: Mutex<HashMap<Uuid, Crop>>,
    pub yield_observations: Mutex<Vec<CropYieldObservation>>,
    pub generative_models: Mutex<HashMap<Uuid, Arc<ClimateGenerativeModel>>>,
    pub yield_models: Mutex<HashMap<Uuid, Arc<CropYieldRegressor>>>,
    /// Serializes ingestion per location so concurrent downloads for the
    /// same location cannot interleave their chunk saves.
    pub ingest_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn ingest_lock(&self, location_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.ingest_locks.lock().await;
        locks.entry(location_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

//! Location registration and lookup, the facade equivalent of
//! `location_repository.py`.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use zappai_core::{Location, ZappaiError};

use crate::error::Result;
use crate::state::AppState;

#[derive(Clone)]
pub struct LocationService {
    state: Arc<AppState>,
}

impl LocationService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn create_location(
        &self,
        country: String,
        name: String,
        longitude: f64,
        latitude: f64,
    ) -> Result<Location> {
        let location = Location::new(country, name, longitude, latitude);
        info!(location_id = %location.id, name = %location.name, "registering location");
        let mut locations = self.state.locations.lock().await;
        locations.insert(location.id, location.clone());
        Ok(location)
    }

    pub async fn get_location(&self, location_id: Uuid) -> Result<Location> {
        let locations = self.state.locations.lock().await;
        locations
            .get(&location_id)
            .cloned()
            .ok_or(ZappaiError::LocationNotFound.into())
    }

    pub async fn list_locations(&self) -> Vec<Location> {
        self.state.locations.lock().await.values().cloned().collect()
    }

    /// Removes a location and whatever per-location state was derived from
    /// it (`DELETE /location/{id}`, spec §6).
    pub async fn delete_location(&self, location_id: Uuid) -> Result<()> {
        let removed = self.state.locations.lock().await.remove(&location_id);
        if removed.is_none() {
            return Err(ZappaiError::LocationNotFound.into());
        }
        self.state.generative_models.lock().await.remove(&location_id);
        self.state.ingest_locks.lock().await.remove(&location_id);
        info!(location_id = %location_id, "deleted location");
        Ok(())
    }
}

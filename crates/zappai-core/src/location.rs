//! A geographic point the system tracks climate and crop data for.
//!
//! Grounded in `tesi/zappai/repositories/dtos.py`'s `Location` DTO and
//! `location_repository.py`.

use crate::climate::SoilTypeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub country: String,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub created_at: DateTime<Utc>,
    /// Set once a location's soil has been classified; climate ingestion
    /// does not require it (spec §3 supplement).
    pub soil_type_id: Option<SoilTypeId>,
}

impl Location {
    pub fn new(country: String, name: String, longitude: f64, latitude: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            country,
            name,
            longitude,
            latitude,
            created_at: Utc::now(),
            soil_type_id: None,
        }
    }
}

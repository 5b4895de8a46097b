//! External data source boundary. No concrete network client is built here
//! (spec §6 non-goal); these traits are where one would plug in, grounded in
//! `copernicus_data_store_api.py` (chunked climate downloads) and
//! `crop_yield_data_repository.py` (bulk yield dataset download).

use async_trait::async_trait;
use uuid::Uuid;
use zappai_core::{FutureClimateRecord, PastClimateRecord};

use crate::error::Result;

/// Downloads climate data for a location in chunks, calling `on_chunk` for
/// each one so the caller can persist incrementally (`on_save_chunk` in the
/// prototype's download functions).
#[async_trait]
pub trait ClimateDataSource: Send + Sync {
    async fn download_past_climate_data(
        &self,
        location_id: Uuid,
        since: Option<zappai_core::YearMonth>,
        on_chunk: &mut (dyn FnMut(Vec<PastClimateRecord>) + Send),
    ) -> Result<()>;

    async fn download_future_climate_data(
        &self,
        location_id: Uuid,
        on_chunk: &mut (dyn FnMut(Vec<FutureClimateRecord>) + Send),
    ) -> Result<()>;
}

/// Downloads the bulk crop-yield observation dataset
/// (`CropYieldDataRepository.__download_crops_yield_data`).
#[async_trait]
pub trait YieldDataSource: Send + Sync {
    async fn download_crop_yield_data(&self, crop_name: &str) -> Result<Vec<CropYieldRow>>;
}

/// One row of the external crop-yield dataset before it is resolved against
/// a known location/crop.
#[derive(Debug, Clone)]
pub struct CropYieldRow {
    pub country: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub crop_name: String,
    pub sowing_year: i32,
    pub sowing_month: u32,
    pub harvest_year: i32,
    pub harvest_month: u32,
    pub yield_per_hectare: f64,
    pub is_outlier: bool,
}

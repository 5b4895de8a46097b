//! Crop catalogue and yield observations.
//!
//! Grounded in `tesi/zappai/dtos.py`'s `CropDTO`/`CropYieldDataDTO`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::YearMonth;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub min_farming_months: u32,
    pub max_farming_months: u32,
}

impl Crop {
    pub fn new(name: String, min_farming_months: u32, max_farming_months: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
            min_farming_months,
            max_farming_months,
        }
    }

    pub fn farming_months_range(&self) -> std::ops::RangeInclusive<u32> {
        self.min_farming_months..=self.max_farming_months
    }
}

/// One recorded sowing/harvest cycle and its yield, before regressor training
/// feature assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropYieldObservation {
    pub location_id: Uuid,
    pub crop_id: Uuid,
    pub sowing: YearMonth,
    pub harvest: YearMonth,
    pub yield_per_hectare: f64,
    /// Flagged by the source dataset itself, independent of the z-score
    /// filter applied at training time (spec §3 two-stage outlier policy).
    pub is_outlier: bool,
}

impl CropYieldObservation {
    pub fn duration_months(&self) -> i64 {
        self.sowing.months_until(self.harvest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_months_counts_sowing_to_harvest() {
        let obs = CropYieldObservation {
            location_id: Uuid::nil(),
            crop_id: Uuid::nil(),
            sowing: YearMonth::new(2019, 3),
            harvest: YearMonth::new(2019, 9),
            yield_per_hectare: 4.2,
            is_outlier: false,
        };
        assert_eq!(obs.duration_months(), 6);
    }
}

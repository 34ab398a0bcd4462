//! Prediction models

use serde::{Deserialize, Serialize};
use validator::Validate;

use riskscore_core::Event;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub location_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub location_lon: f64,
    pub login_count_day: u32,
}

impl From<PredictRequest> for Event {
    fn from(req: PredictRequest) -> Self {
        Self {
            user_id: req.user_id,
            location_lat: req.location_lat,
            location_lon: req.location_lon,
            login_count_day: req.login_count_day,
        }
    }
}

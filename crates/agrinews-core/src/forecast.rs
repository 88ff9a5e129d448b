use serde::{Deserialize, Serialize};

/// Crop price outlook produced by the demand forecast job.
///
/// Neutral crops are never listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub increasing: Vec<CropTrend>,
    pub decreasing: Vec<CropTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropTrend {
    pub crop: String,
    /// Current price estimate in Philippine pesos.
    pub price: f64,
    pub analysis: String,
}

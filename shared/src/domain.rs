//! Wire DTOs shared with the ride service, plus the client-side shapes built
//! from them. Field names match the JSON the service speaks.

use serde::{Deserialize, Serialize};

/// Validated lat/lon pair.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        if !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

/// Body of `POST /ride/estimate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub customer_id: String,
    pub origin: String,
    pub destination: String,
}

/// Driver rating attached to a ride option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionReview {
    pub rating: f64,
    pub comment: String,
}

/// One driver/vehicle offer inside an estimate. The user picks one of these
/// to turn the estimate into a confirmed ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub vehicle: String,
    pub review: OptionReview,
    pub value: f64,
}

/// Quoted ride as returned by the estimate endpoint. Transient: lives only in
/// UI state for the duration of the estimate-to-confirm flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideEstimate {
    pub origin: LatLon,
    pub destination: LatLon,
    pub distance: f64,
    pub duration: String,
    pub options: Vec<RideOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRef {
    pub id: String,
    pub name: String,
}

/// Body of `PATCH /ride/confirm`, assembled client-side from the estimate and
/// the selected option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmRideRequest {
    pub customer_id: String,
    pub origin: String,
    pub destination: String,
    pub distance: f64,
    pub duration: String,
    pub driver: DriverRef,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmResponse {
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

/// One ride from `GET /ride/{customer_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRide {
    pub id: String,
    pub date: String,
    pub origin: String,
    pub destination: String,
    pub distance: f64,
    pub duration: String,
    pub driver: DriverRef,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub customer_id: String,
    pub rides: Vec<RemoteRide>,
}

/// Error body the service sends on non-2xx responses. Both fields are
/// optional in practice; unparseable bodies map to a generic unknown error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

//! Insert-only store of rides confirmed from this device.
//!
//! Records are written exactly once, after the remote service confirms a
//! ride, and are never edited or deleted afterwards. The store lives in the
//! model and is persisted as a JSON blob through the key-value capability;
//! queries return full snapshots, which is what the history merge consumes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// A ride persisted on-device. `id` is assigned by the store and shares no
/// keyspace with server-side ride ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRide {
    pub id: u64,
    pub customer_id: String,
    pub date: Option<String>,
    pub origin: String,
    pub destination: String,
    pub distance: f64,
    pub duration: String,
    pub driver_id: String,
    pub driver_name: String,
    pub value: f64,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRide {
    pub customer_id: String,
    pub date: Option<String>,
    pub origin: String,
    pub destination: String,
    pub distance: f64,
    pub duration: String,
    pub driver_id: String,
    pub driver_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("failed to encode ride store: {0}")]
    Encode(String),

    #[error("failed to decode ride store: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideStore {
    schema_version: u32,
    next_id: u64,
    records: Vec<StoredRide>,
}

impl Default for RideStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RideStore {
    pub fn new() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            next_id: 1,
            records: Vec::new(),
        }
    }

    /// Appends one record with a fresh id and returns a copy of it.
    pub fn insert(&mut self, ride: NewRide) -> StoredRide {
        let record = StoredRide {
            id: self.next_id,
            customer_id: ride.customer_id,
            date: ride.date,
            origin: ride.origin,
            destination: ride.destination,
            distance: ride.distance,
            duration: ride.duration,
            driver_id: ride.driver_id,
            driver_name: ride.driver_name,
            value: ride.value,
        };
        self.next_id += 1;
        self.records.push(record.clone());
        record
    }

    /// Snapshot of the customer's rides, optionally narrowed to one driver.
    /// Returned in insertion order.
    pub fn query(&self, customer_id: &str, driver_id: Option<&str>) -> Vec<StoredRide> {
        self.records
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .filter(|r| driver_id.map_or(true, |d| r.driver_id == d))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(self).map_err(|e| StoreError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ride_for(customer_id: &str, driver_id: &str) -> NewRide {
        NewRide {
            customer_id: customer_id.into(),
            date: None,
            origin: "Origin A".into(),
            destination: "Destination B".into(),
            distance: 3.2,
            duration: "12 mins".into(),
            driver_id: driver_id.into(),
            driver_name: "Homer Simpson".into(),
            value: 50.05,
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut store = RideStore::new();
        let first = store.insert(ride_for("CT01", "1")).id;
        let second = store.insert(ride_for("CT01", "1")).id;
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_query_filters_by_customer() {
        let mut store = RideStore::new();
        store.insert(ride_for("CT01", "1"));
        store.insert(ride_for("CT02", "1"));

        let rides = store.query("CT01", None);
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].customer_id, "CT01");
    }

    #[test]
    fn test_query_filters_by_driver() {
        let mut store = RideStore::new();
        store.insert(ride_for("CT01", "1"));
        store.insert(ride_for("CT01", "2"));

        let rides = store.query("CT01", Some("2"));
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].driver_id, "2");

        assert_eq!(store.query("CT01", None).len(), 2);
    }

    #[test]
    fn test_roundtrip_through_bytes() {
        let mut store = RideStore::new();
        store.insert(ride_for("CT01", "1"));

        let bytes = store.to_bytes().unwrap();
        let restored = RideStore::from_bytes(&bytes).unwrap();

        assert_eq!(restored.len(), 1);
        assert_eq!(restored.query("CT01", None), store.query("CT01", None));
        // restored store keeps assigning fresh ids
        let mut restored = restored;
        assert_eq!(restored.insert(ride_for("CT01", "1")).id, 2);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            RideStore::from_bytes(b"not json"),
            Err(StoreError::Decode(_))
        ));
    }
}

//! Static driver capability table.
//!
//! Each known driver has a minimum distance below which they refuse a ride.
//! The table is immutable and built into the binary; lookups are
//! case-insensitive on the driver name. Names the table does not know resolve
//! to a maximal-threshold sentinel, so an unrecognised driver rejects
//! effectively every ride. That fallback is policy, not an error.

/// Threshold applied to driver names missing from the table.
pub const UNKNOWN_DRIVER_MINIMUM_KM: f64 = f64::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverCapability {
    pub name: &'static str,
    pub minimum_distance_km: f64,
}

pub const DRIVER_CAPABILITIES: &[DriverCapability] = &[
    DriverCapability {
        name: "Homer Simpson",
        minimum_distance_km: 1.0,
    },
    DriverCapability {
        name: "Dominic Toretto",
        minimum_distance_km: 5.0,
    },
    DriverCapability {
        name: "James Bond",
        minimum_distance_km: 10.0,
    },
];

/// Minimum distance (km) the named driver will accept.
pub fn minimum_distance_km(driver_name: &str) -> f64 {
    let folded = driver_name.to_lowercase();
    DRIVER_CAPABILITIES
        .iter()
        .find(|entry| entry.name.to_lowercase() == folded)
        .map(|entry| entry.minimum_distance_km)
        .unwrap_or(UNKNOWN_DRIVER_MINIMUM_KM)
}

/// Whether the named driver accepts a ride of the given distance.
pub fn accepts_distance(driver_name: &str, distance_km: f64) -> bool {
    distance_km >= minimum_distance_km(driver_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_drivers_have_one_entry_each() {
        for entry in DRIVER_CAPABILITIES {
            let count = DRIVER_CAPABILITIES
                .iter()
                .filter(|other| other.name.eq_ignore_ascii_case(entry.name))
                .count();
            assert_eq!(count, 1, "duplicate table entry for {}", entry.name);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(minimum_distance_km("homer simpson"), 1.0);
        assert_eq!(minimum_distance_km("HOMER SIMPSON"), 1.0);
        assert_eq!(minimum_distance_km("Dominic Toretto"), 5.0);
        assert_eq!(minimum_distance_km("james BOND"), 10.0);
    }

    #[test]
    fn test_unknown_driver_rejects_everything() {
        assert_eq!(minimum_distance_km("Unknown Driver"), UNKNOWN_DRIVER_MINIMUM_KM);
        assert!(!accepts_distance("Unknown Driver", 10_000.0));
    }

    #[test]
    fn test_accepts_distance_at_threshold() {
        assert!(accepts_distance("Homer Simpson", 1.0));
        assert!(!accepts_distance("James Bond", 9.9));
        assert!(accepts_distance("James Bond", 10.0));
    }
}

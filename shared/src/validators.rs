//! Pure input validators. Synchronous, side-effect free, deterministic; the
//! first failing check wins and no errors are aggregated.

use thiserror::Error;

use crate::domain::RideOption;
use crate::drivers;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("customer id must not be blank")]
    InvalidCustomerId,

    #[error("origin must not be blank")]
    InvalidOrigin,

    #[error("destination must not be blank")]
    InvalidDestination,

    #[error("{driver} does not accept rides shorter than {minimum_km} km")]
    InvalidDistance { driver: String, minimum_km: f64 },
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks the estimate form fields in order: customer id, origin,
/// destination.
pub fn validate_estimate_inputs(
    customer_id: &str,
    origin: &str,
    destination: &str,
) -> Result<(), ValidationError> {
    if is_blank(customer_id) {
        return Err(ValidationError::InvalidCustomerId);
    }
    if is_blank(origin) {
        return Err(ValidationError::InvalidOrigin);
    }
    if is_blank(destination) {
        return Err(ValidationError::InvalidDestination);
    }
    Ok(())
}

pub fn validate_history_inputs(customer_id: &str) -> Result<(), ValidationError> {
    if is_blank(customer_id) {
        return Err(ValidationError::InvalidCustomerId);
    }
    Ok(())
}

/// Rejects a selected option whose driver will not accept a ride of the
/// quoted distance.
pub fn validate_driver_distance(
    option: &RideOption,
    distance_km: f64,
) -> Result<(), ValidationError> {
    let minimum_km = drivers::minimum_distance_km(&option.name);
    if minimum_km > distance_km {
        return Err(ValidationError::InvalidDistance {
            driver: option.name.clone(),
            minimum_km,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptionReview;

    fn option_named(name: &str) -> RideOption {
        RideOption {
            id: "1".into(),
            name: name.into(),
            description: String::new(),
            vehicle: String::new(),
            review: OptionReview {
                rating: 5.0,
                comment: String::new(),
            },
            value: 10.0,
        }
    }

    #[test]
    fn test_blank_customer_id_rejected_first() {
        assert_eq!(
            validate_estimate_inputs("", "", ""),
            Err(ValidationError::InvalidCustomerId)
        );
        assert_eq!(
            validate_estimate_inputs("   ", "Origin A", "Destination B"),
            Err(ValidationError::InvalidCustomerId)
        );
    }

    #[test]
    fn test_blank_origin_rejected_second() {
        assert_eq!(
            validate_estimate_inputs("CT01", "", ""),
            Err(ValidationError::InvalidOrigin)
        );
    }

    #[test]
    fn test_blank_destination_rejected_last() {
        assert_eq!(
            validate_estimate_inputs("CT01", "Origin A", "  "),
            Err(ValidationError::InvalidDestination)
        );
    }

    #[test]
    fn test_well_formed_inputs_pass() {
        assert_eq!(
            validate_estimate_inputs("CT01", "Origin A", "Destination B"),
            Ok(())
        );
    }

    #[test]
    fn test_history_requires_customer_id() {
        assert_eq!(
            validate_history_inputs(""),
            Err(ValidationError::InvalidCustomerId)
        );
        assert_eq!(validate_history_inputs("CT01"), Ok(()));
    }

    #[test]
    fn test_driver_below_minimum_rejected() {
        let option = option_named("James Bond");
        let result = validate_driver_distance(&option, 3.0);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidDistance { minimum_km, .. }) if minimum_km == 10.0
        ));
    }

    #[test]
    fn test_driver_at_or_above_minimum_accepted() {
        let option = option_named("Dominic Toretto");
        assert_eq!(validate_driver_distance(&option, 5.0), Ok(()));
        assert_eq!(validate_driver_distance(&option, 12.5), Ok(()));
    }

    #[test]
    fn test_unknown_driver_rejected_by_sentinel() {
        let option = option_named("Nobody In Particular");
        assert!(validate_driver_distance(&option, 1_000_000.0).is_err());
    }
}

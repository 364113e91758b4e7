//! Submit gating on the resolver's coordinate.
//!
//! `(0, 0)` is treated as "nothing resolved" unless the user entered it by
//! hand, in which case the manual source vouches for it.

use crate::error::IntakeError;
use crate::models::{Coordinate, CoordinateSource};
use crate::resolver::CoordinateResolver;
use tracing::info;

/// Location handed to the chart service once the gate opens.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub location: String,
    pub coordinate: Coordinate,
}

pub fn can_submit(resolver: &CoordinateResolver) -> bool {
    !resolver.coordinate().is_unset() || resolver.source() == CoordinateSource::Manual
}

/// Returns the location to submit, or the blocking validation error.
pub fn check(resolver: &CoordinateResolver) -> Result<ResolvedLocation, IntakeError> {
    if !can_submit(resolver) {
        info!(
            "Submission blocked: '{}' has no usable coordinate ({:?})",
            resolver.location_text(),
            resolver.status()
        );
        return Err(IntakeError::MissingCoordinate);
    }

    Ok(ResolvedLocation {
        location: resolver.location_text().to_string(),
        coordinate: resolver.coordinate(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeocodeHit;

    #[test]
    fn fresh_resolver_is_blocked() {
        let resolver = CoordinateResolver::with_location("London, UK");
        assert!(!can_submit(&resolver));
        assert_eq!(check(&resolver), Err(IntakeError::MissingCoordinate));
    }

    #[test]
    fn manual_entry_opens_the_gate() {
        let mut resolver = CoordinateResolver::with_location("Somewhere");
        resolver.enter_manual_coordinate(10.0, 20.0).unwrap();
        assert!(can_submit(&resolver));

        let resolved = check(&resolver).unwrap();
        assert_eq!(resolved.location, "Somewhere");
        assert_eq!(resolved.coordinate, Coordinate::new(10.0, 20.0).unwrap());
    }

    #[test]
    fn manual_origin_is_accepted() {
        let mut resolver = CoordinateResolver::with_location("Null Island");
        resolver.enter_manual_coordinate(0.0, 0.0).unwrap();
        assert!(can_submit(&resolver));
    }

    #[test]
    fn geocoded_origin_is_treated_as_unset() {
        let mut resolver = CoordinateResolver::with_location("Null Island");
        let ticket = resolver.resolve_on_commit().unwrap();
        resolver.apply_lookup(
            &ticket,
            Ok(Some(GeocodeHit {
                coordinate: Coordinate::UNSET,
                display_name: "Null Island".to_string(),
            })),
        );
        assert_eq!(resolver.source(), CoordinateSource::Geocoded);
        assert!(!can_submit(&resolver));
    }

    #[test]
    fn edit_after_resolution_closes_the_gate() {
        let mut resolver = CoordinateResolver::with_location("Paris");
        resolver.enter_manual_coordinate(48.85, 2.35).unwrap();
        resolver.edit_location("Paris, Texas");
        assert!(!can_submit(&resolver));
    }
}

//! Coordinate resolution for the birth-location field.
//!
//! [`CoordinateResolver`] owns the location text and the coordinate derived
//! from it, and reconciles the three ways a coordinate can arrive: automatic
//! geocoding, manual numeric entry and a map pick.
//!
//! The resolver never performs I/O itself. [`CoordinateResolver::resolve_on_commit`]
//! hands out a [`LookupTicket`]; whoever runs the lookup reports back through
//! [`CoordinateResolver::apply_lookup`] with the same ticket. A ticket is only
//! honoured while its generation and query still match the resolver, so a
//! response for text the user has since edited (or overridden by hand) is
//! dropped on the floor.

use crate::api::Geocoder;
use crate::error::IntakeError;
use crate::models::{
    valid_latitude, valid_longitude, Coordinate, CoordinateAxis, CoordinateSource, GeocodeHit,
    ResolutionStatus,
};
use color_eyre::Result;
use tracing::{debug, info, warn};

/// Tag attached to an outstanding lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    query: String,
}

impl LookupTicket {
    /// Text the lookup was issued for.
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Default)]
pub struct CoordinateResolver {
    location_text: String,
    status: ResolutionStatus,
    source: CoordinateSource,
    coordinate: Coordinate,
    display_name: Option<String>,
    // Bumped by every user-initiated transition that supersedes a pending lookup.
    generation: u64,
}

impl CoordinateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session with pre-filled, not yet resolved, location text.
    pub fn with_location(text: impl Into<String>) -> Self {
        Self {
            location_text: text.into(),
            ..Self::default()
        }
    }

    pub fn location_text(&self) -> &str {
        &self.location_text
    }

    pub fn status(&self) -> ResolutionStatus {
        self.status
    }

    pub fn source(&self) -> CoordinateSource {
        self.source
    }

    /// Raw coordinate, [`Coordinate::UNSET`] while nothing is established.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// The coordinate, if any channel has established one.
    pub fn resolved(&self) -> Option<Coordinate> {
        match self.source {
            CoordinateSource::None => None,
            CoordinateSource::Geocoded | CoordinateSource::Manual => Some(self.coordinate),
        }
    }

    /// Place name reported by the geocoder for the current coordinate.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Replaces the location text and invalidates whatever was resolved.
    pub fn edit_location(&mut self, text: impl Into<String>) {
        self.location_text = text.into();
        self.clear_coordinate();
        self.status = ResolutionStatus::Idle;
        self.generation += 1;
    }

    /// Called when the user leaves the location field.
    ///
    /// Returns a ticket when a lookup should be dispatched. Only an `Idle`
    /// resolver dispatches; a second commit while `Searching` (or after the
    /// cycle finished) is ignored. Blank text settles to `Idle` without a lookup.
    pub fn resolve_on_commit(&mut self) -> Option<LookupTicket> {
        if self.status != ResolutionStatus::Idle {
            debug!("Commit ignored, resolver is {:?}", self.status);
            return None;
        }

        if self.location_text.trim().is_empty() {
            self.clear_coordinate();
            return None;
        }

        self.status = ResolutionStatus::Searching;
        debug!("Dispatching lookup for '{}'", self.location_text);

        Some(LookupTicket {
            generation: self.generation,
            query: self.location_text.clone(),
        })
    }

    /// Applies a lookup result. Returns `false` when the ticket is stale.
    ///
    /// Failures and empty results both land in `NotFound`.
    pub fn apply_lookup(
        &mut self,
        ticket: &LookupTicket,
        outcome: Result<Option<GeocodeHit>>,
    ) -> bool {
        if ticket.generation != self.generation
            || ticket.query != self.location_text
            || self.status != ResolutionStatus::Searching
        {
            debug!("Discarding stale lookup result for '{}'", ticket.query);
            return false;
        }

        match outcome {
            Ok(Some(hit)) => {
                info!(
                    "Resolved '{}' to ({}, {}) - {}",
                    ticket.query, hit.coordinate.latitude, hit.coordinate.longitude, hit.display_name
                );
                self.status = ResolutionStatus::Found;
                self.source = CoordinateSource::Geocoded;
                self.coordinate = hit.coordinate;
                self.display_name = Some(hit.display_name);
            }
            Ok(None) => {
                info!("No geocoding match for '{}'", ticket.query);
                self.mark_not_found();
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", ticket.query, e);
                self.mark_not_found();
            }
        }
        true
    }

    /// Commit + lookup + apply in one go, for callers that can await inline.
    ///
    /// Returns `true` if a lookup ran and its result was applied.
    pub async fn resolve_with<G: Geocoder + ?Sized>(&mut self, geocoder: &G) -> bool {
        let Some(ticket) = self.resolve_on_commit() else {
            return false;
        };
        let outcome = geocoder.lookup(ticket.query().trim().to_string()).await;
        self.apply_lookup(&ticket, outcome)
    }

    /// Explicit coordinate typed by the user.
    pub fn enter_manual_coordinate(&mut self, latitude: f64, longitude: f64) -> Result<(), IntakeError> {
        let coordinate = Coordinate::new(latitude, longitude)?;
        self.commit_manual(coordinate);
        Ok(())
    }

    /// Coordinate confirmed on the map picker. Same effect as manual entry.
    pub fn select_from_map(&mut self, latitude: f64, longitude: f64) -> Result<(), IntakeError> {
        let coordinate = Coordinate::new(latitude, longitude)?;
        debug!("Map selection confirmed at ({}, {})", latitude, longitude);
        self.commit_manual(coordinate);
        Ok(())
    }

    /// Adjusts one component of an established coordinate; status and
    /// source are left as they are.
    pub fn edit_coordinate_field(&mut self, axis: CoordinateAxis, value: f64) -> Result<(), IntakeError> {
        if self.source == CoordinateSource::None {
            return Err(IntakeError::CoordinateNotEstablished);
        }

        match axis {
            CoordinateAxis::Latitude if valid_latitude(value) => self.coordinate.latitude = value,
            CoordinateAxis::Longitude if valid_longitude(value) => self.coordinate.longitude = value,
            CoordinateAxis::Latitude => {
                return Err(IntakeError::InvalidCoordinate(value, self.coordinate.longitude))
            }
            CoordinateAxis::Longitude => {
                return Err(IntakeError::InvalidCoordinate(self.coordinate.latitude, value))
            }
        }
        Ok(())
    }

    fn commit_manual(&mut self, coordinate: Coordinate) {
        self.coordinate = coordinate;
        self.source = CoordinateSource::Manual;
        self.status = ResolutionStatus::Found;
        self.display_name = None;
        self.generation += 1;
    }

    fn mark_not_found(&mut self) {
        self.status = ResolutionStatus::NotFound;
        self.clear_coordinate();
    }

    fn clear_coordinate(&mut self) {
        self.coordinate = Coordinate::UNSET;
        self.source = CoordinateSource::None;
        self.display_name = None;
    }
}

use crate::error::IntakeError;
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees (WGS84).
///
/// `(0, 0)` doubles as the "unset" marker; see [`Coordinate::UNSET`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Placeholder held whenever no coordinate has been established.
    pub const UNSET: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Builds a coordinate, rejecting non-finite or out-of-range components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, IntakeError> {
        if !valid_latitude(latitude) || !valid_longitude(longitude) {
            return Err(IntakeError::InvalidCoordinate(latitude, longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn is_unset(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

pub(crate) fn valid_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

pub(crate) fn valid_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

/// Where the resolver is in its lookup cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionStatus {
    #[default]
    Idle,
    Searching,
    Found,
    NotFound,
}

/// Provenance of the coordinate currently held by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSource {
    #[default]
    None,
    Geocoded,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateAxis {
    Latitude,
    Longitude,
}

impl CoordinateAxis {
    pub fn label(self) -> &'static str {
        match self {
            CoordinateAxis::Latitude => "Latitude",
            CoordinateAxis::Longitude => "Longitude",
        }
    }
}

/// First candidate returned by a geocoding lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    pub display_name: String,
}

/// One element of a Nominatim `/search?format=json` response.
/// Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

impl TryFrom<NominatimPlace> for GeocodeHit {
    type Error = color_eyre::Report;

    fn try_from(place: NominatimPlace) -> Result<Self> {
        let latitude = place
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|e| eyre!("invalid lat '{}': {}", place.lat, e))?;
        let longitude = place
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|e| eyre!("invalid lon '{}': {}", place.lon, e))?;
        let coordinate = Coordinate::new(latitude, longitude)?;

        Ok(Self {
            coordinate,
            display_name: place.display_name,
        })
    }
}

// Calculation and interpretation parameters forwarded to the chart service.
// Each enum cycles through its variants so the admin panel can step them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HouseSystem {
    #[default]
    Placidus,
    Koch,
    Regiomontanus,
}

impl HouseSystem {
    pub fn cycle(self, forward: bool) -> Self {
        use HouseSystem::*;
        match (self, forward) {
            (Placidus, true) | (Regiomontanus, false) => Koch,
            (Koch, true) | (Placidus, false) => Regiomontanus,
            (Regiomontanus, true) | (Koch, false) => Placidus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HouseSystem::Placidus => "Placidus",
            HouseSystem::Koch => "Koch",
            HouseSystem::Regiomontanus => "Regiomontanus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EphemerisSource {
    #[default]
    SwissEphemeris,
    Nasa,
}

impl EphemerisSource {
    pub fn cycle(self) -> Self {
        match self {
            EphemerisSource::SwissEphemeris => EphemerisSource::Nasa,
            EphemerisSource::Nasa => EphemerisSource::SwissEphemeris,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EphemerisSource::SwissEphemeris => "Swiss Ephemeris",
            EphemerisSource::Nasa => "NASA JPL (Experimental)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpretationEngine {
    RuleBased,
    #[default]
    Hybrid,
    PureAi,
}

impl InterpretationEngine {
    pub fn cycle(self, forward: bool) -> Self {
        use InterpretationEngine::*;
        match (self, forward) {
            (RuleBased, true) | (PureAi, false) => Hybrid,
            (Hybrid, true) | (RuleBased, false) => PureAi,
            (PureAi, true) | (Hybrid, false) => RuleBased,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InterpretationEngine::RuleBased => "Rule-Based Only",
            InterpretationEngine::Hybrid => "Hybrid (Rules + AI Synthesis)",
            InterpretationEngine::PureAi => "Pure AI (Max Creativity)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NarrativeStyle {
    #[default]
    Professional,
    Poetic,
    Debug,
}

impl NarrativeStyle {
    pub fn cycle(self, forward: bool) -> Self {
        use NarrativeStyle::*;
        match (self, forward) {
            (Professional, true) | (Debug, false) => Poetic,
            (Poetic, true) | (Professional, false) => Debug,
            (Debug, true) | (Poetic, false) => Professional,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NarrativeStyle::Professional => "Professional",
            NarrativeStyle::Poetic => "Poetic",
            NarrativeStyle::Debug => "Debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiModel {
    #[default]
    Gemini,
    Gpt4,
    Custom,
}

impl AiModel {
    pub fn cycle(self, forward: bool) -> Self {
        use AiModel::*;
        match (self, forward) {
            (Gemini, true) | (Custom, false) => Gpt4,
            (Gpt4, true) | (Gemini, false) => Custom,
            (Custom, true) | (Gpt4, false) => Gemini,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AiModel::Gemini => "Gemini",
            AiModel::Gpt4 => "GPT-4",
            AiModel::Custom => "Custom Local Model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationParams {
    pub house_system: HouseSystem,
    pub ephemeris_source: EphemerisSource,
    pub interpretation_engine: InterpretationEngine,
    pub narrative_style: NarrativeStyle,
    pub ai_model: AiModel,
    pub ai_temperature: f64,
    pub ai_prompt_version: String,
}

impl Default for CalculationParams {
    fn default() -> Self {
        Self {
            house_system: HouseSystem::default(),
            ephemeris_source: EphemerisSource::default(),
            interpretation_engine: InterpretationEngine::default(),
            narrative_style: NarrativeStyle::default(),
            ai_model: AiModel::default(),
            ai_temperature: 0.7,
            ai_prompt_version: "v1.2-beta".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_out_of_range_and_non_finite() {
        assert!(Coordinate::new(48.8566, 2.3522).is_ok());
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(IntakeError::InvalidCoordinate(91.0, 0.0))
        );
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 10.0).is_err());
        assert!(Coordinate::new(10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn only_origin_counts_as_unset() {
        assert!(Coordinate::UNSET.is_unset());
        assert!(Coordinate::default().is_unset());
        assert!(!Coordinate::new(0.0, 12.0).unwrap().is_unset());
    }

    #[test]
    fn nominatim_place_parses_string_coordinates() {
        let place = NominatimPlace {
            lat: "48.8566".into(),
            lon: " 2.3522".into(),
            display_name: "Paris, France".into(),
        };
        let hit = GeocodeHit::try_from(place).unwrap();
        assert_eq!(hit.coordinate, Coordinate::new(48.8566, 2.3522).unwrap());
        assert_eq!(hit.display_name, "Paris, France");
    }

    #[test]
    fn nominatim_place_with_garbage_lat_is_an_error() {
        let place = NominatimPlace {
            lat: "north".into(),
            lon: "2.0".into(),
            display_name: "Somewhere".into(),
        };
        assert!(GeocodeHit::try_from(place).is_err());
    }

    #[test]
    fn parameter_cycles_round_trip() {
        let h = HouseSystem::Placidus;
        assert_eq!(h.cycle(true).cycle(false), h);
        assert_eq!(h.cycle(true).cycle(true).cycle(true), h);
        assert_eq!(AiModel::Custom.cycle(true), AiModel::Gemini);
        assert_eq!(EphemerisSource::Nasa.cycle(), EphemerisSource::SwissEphemeris);
    }
}

use crate::chart::ChartRequest;
use crate::error::IntakeError;
use crate::gate;
use crate::models::CalculationParams;
use crate::resolver::CoordinateResolver;
use chrono::{NaiveDate, NaiveTime};

/// One birth-data input session. Dropped (or [`reset`](BirthForm::reset))
/// when the user starts over; nothing is persisted.
#[derive(Debug)]
pub struct BirthForm {
    pub name: String,
    pub date: String,
    pub time: String,
    pub resolver: CoordinateResolver,
    pub params: CalculationParams,
}

impl Default for BirthForm {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            date: "1990-01-01".to_string(),
            time: "12:00".to_string(),
            resolver: CoordinateResolver::with_location("London, UK"),
            params: CalculationParams::default(),
        }
    }
}

impl BirthForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validates the form and builds the chart request.
    ///
    /// The location gate is checked last so field typos are reported first.
    pub fn validate(&self, is_admin: bool) -> Result<ChartRequest, IntakeError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(IntakeError::MissingField("Name"));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| IntakeError::InvalidDate(self.date.clone()))?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| IntakeError::InvalidTime(self.time.clone()))?;

        let temperature = self.params.ai_temperature;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(IntakeError::InvalidTemperature(temperature));
        }

        let resolved = gate::check(&self.resolver)?;

        Ok(ChartRequest {
            name: name.to_string(),
            date,
            time,
            location: resolved.location,
            latitude: resolved.coordinate.latitude,
            longitude: resolved.coordinate.longitude,
            params: self.params.clone(),
            is_admin,
        })
    }
}

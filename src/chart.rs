//! Downstream chart and narrative service.
//!
//! Only a mock exists: after a fixed delay it returns a canned chart and
//! narrative shaped by the request parameters. Nothing here computes
//! positions.

use crate::models::{CalculationParams, Coordinate};
use chrono::{NaiveDate, NaiveTime};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Everything the service needs, produced by a validated form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub params: CalculationParams,
    pub is_admin: bool,
}

impl ChartRequest {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub name: String,
    pub sign: String,
    pub degree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub planet1: String,
    pub planet2: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub orb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstrologicalChart {
    pub birth_date: String,
    pub birth_time: String,
    pub birth_location: String,
    pub house_system: String,
    pub positions: Vec<PlanetPosition>,
    pub aspects: Vec<Aspect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeSection {
    pub title: String,
    pub content: String,
    pub source_rule_or_prompt_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoroscopeNarrative {
    pub title: String,
    pub summary: String,
    pub sections: Vec<NarrativeSection>,
    pub raw_ai_output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesStep {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeCorrectionStep {
    pub local_time: String,
    pub universal_time: String,
    pub offset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmConfigStep {
    pub house_system: String,
    pub ephemeris_source: String,
    pub interpretation_engine: String,
    pub ai_model: String,
    pub temperature: f64,
}

/// Intermediate values exposed to admin sessions only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSteps {
    pub coordinates: CoordinatesStep,
    pub time_correction: TimeCorrectionStep,
    pub aspects: Vec<Aspect>,
    pub pm_config: PmConfigStep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessFlowResult {
    pub chart: AstrologicalChart,
    pub narrative: HoroscopeNarrative,
    pub processing_steps: Option<ProcessingSteps>,
}

pub struct MockChartService {
    delay: Duration,
}

impl MockChartService {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn process(&self, request: &ChartRequest) -> Result<ProcessFlowResult> {
        info!(
            "Processing chart for '{}' at ({}, {}) with {:?}",
            request.location, request.latitude, request.longitude, request.params.interpretation_engine
        );
        tokio::time::sleep(self.delay).await;

        let params = &request.params;
        let aspects = vec![aspect("Sun", "Moon", "Opposition", 1.6)];

        let chart = AstrologicalChart {
            birth_date: request.date.format("%Y-%m-%d").to_string(),
            birth_time: request.time.format("%H:%M").to_string(),
            birth_location: request.location.clone(),
            house_system: params.house_system.label().to_string(),
            positions: vec![
                position("Sun", "Aries", 15.5),
                position("Moon", "Libra", 22.1),
                position("Ascendant", "Cancer", 5.0),
            ],
            aspects: aspects.clone(),
        };

        let narrative = HoroscopeNarrative {
            title: format!(
                "Your Destiny (Generated with Temperature: {})",
                params.ai_temperature
            ),
            summary: format!(
                "A high-level summary generated using {}.",
                params.interpretation_engine.label()
            ),
            sections: vec![
                section(
                    "I. Core Identity (Sun in Aries)",
                    "The Sun in Aries placement suggests a dynamic and pioneering spirit. This energy often translates into leadership and a need for independent action.".to_string(),
                    "R-SUN-ARIES-01",
                ),
                section(
                    "II. Emotional Landscape (Moon in Libra)",
                    "The Moon in Libra indicates a need for harmony and balance in emotional expression. You seek fairness and partnership.".to_string(),
                    "R-MOON-LIBRA-03",
                ),
                section(
                    "III. Synthesized Narrative (AI Layer)",
                    format!(
                        "The opposition between the Sun and Moon creates a push-pull dynamic. This narrative was synthesized with a {} focus at temperature {}.",
                        params.narrative_style.label(),
                        params.ai_temperature
                    ),
                    "P-OPPOSITION-AI-01",
                ),
            ],
            raw_ai_output: serde_json::json!({
                "sun_in_aries": "dynamic",
                "moon_in_libra": "balanced",
                "model": params.ai_model.label(),
                "prompt_version": params.ai_prompt_version,
            })
            .to_string(),
        };

        let processing_steps = request.is_admin.then(|| ProcessingSteps {
            coordinates: CoordinatesStep {
                latitude: request.latitude,
                longitude: request.longitude,
                timezone: "UTC".to_string(),
            },
            time_correction: TimeCorrectionStep {
                local_time: request.time.format("%H:%M").to_string(),
                universal_time: "12:00:00".to_string(),
                offset: "0:00".to_string(),
            },
            aspects,
            pm_config: PmConfigStep {
                house_system: params.house_system.label().to_string(),
                ephemeris_source: params.ephemeris_source.label().to_string(),
                interpretation_engine: params.interpretation_engine.label().to_string(),
                ai_model: params.ai_model.label().to_string(),
                temperature: params.ai_temperature,
            },
        });

        Ok(ProcessFlowResult {
            chart,
            narrative,
            processing_steps,
        })
    }
}

fn position(name: &str, sign: &str, degree: f64) -> PlanetPosition {
    PlanetPosition {
        name: name.to_string(),
        sign: sign.to_string(),
        degree,
    }
}

fn aspect(planet1: &str, planet2: &str, kind: &str, orb: f64) -> Aspect {
    Aspect {
        planet1: planet1.to_string(),
        planet2: planet2.to_string(),
        kind: kind.to_string(),
        orb,
    }
}

fn section(title: &str, content: String, id: &str) -> NarrativeSection {
    NarrativeSection {
        title: title.to_string(),
        content,
        source_rule_or_prompt_id: Some(id.to_string()),
    }
}

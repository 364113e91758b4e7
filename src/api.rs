//! Address-to-coordinate lookup.
//!
//! [`Geocoder`] is the seam the resolver and the event loop talk to;
//! [`NominatimClient`] is the production implementation backed by the
//! OpenStreetMap Nominatim search endpoint.

use crate::config::GeocodingConfig;
use crate::models::{GeocodeHit, NominatimPlace};
use color_eyre::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// A forward geocoding provider.
///
/// `Ok(None)` means the service answered but had no candidate; `Err` covers
/// transport, status and parse failures. Callers treat both the same way.
pub trait Geocoder: Send + Sync + 'static {
    fn lookup(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<GeocodeHit>>> + Send + '_>>;
}

pub struct NominatimClient {
    client: Client,
    endpoint: String,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Single GET with `q`, `format=json`, `limit=1`. No retries.
    pub async fn search(&self, query: &str) -> Result<Option<GeocodeHit>> {
        debug!("Geocoding '{}' via {}", query, self.endpoint);

        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_search_response(&body)
    }
}

impl Geocoder for NominatimClient {
    fn lookup(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<GeocodeHit>>> + Send + '_>> {
        Box::pin(async move { self.search(&query).await })
    }
}

/// Takes the first candidate of a search response, if any.
pub fn parse_search_response(body: &str) -> Result<Option<GeocodeHit>> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)?;
    places.into_iter().next().map(GeocodeHit::try_from).transpose()
}

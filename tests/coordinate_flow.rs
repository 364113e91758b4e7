use color_eyre::{eyre::eyre, Result};
use lilith_intake::api::Geocoder;
use lilith_intake::chart::MockChartService;
use lilith_intake::form::BirthForm;
use lilith_intake::gate;
use lilith_intake::map_picker::{MapSelectionChannel, MapView};
use lilith_intake::models::{Coordinate, CoordinateSource, GeocodeHit, ResolutionStatus};
use lilith_intake::resolver::CoordinateResolver;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Answers from a fixed table; unknown queries fail like a dead network.
#[derive(Default)]
struct ScriptedGeocoder {
    answers: HashMap<String, Option<GeocodeHit>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl ScriptedGeocoder {
    fn with(mut self, query: &str, answer: Option<(f64, f64, &str)>) -> Self {
        let hit = answer.map(|(lat, lon, name)| GeocodeHit {
            coordinate: Coordinate::new(lat, lon).unwrap(),
            display_name: name.to_string(),
        });
        self.answers.insert(query.to_string(), hit);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for ScriptedGeocoder {
    fn lookup(
        &self,
        query: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<GeocodeHit>>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.get(&query).cloned();
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            answer.ok_or_else(|| eyre!("connection refused"))
        })
    }
}

fn geocoder() -> ScriptedGeocoder {
    ScriptedGeocoder::default()
        .with("Paris, France", Some((48.8566, 2.3522, "Paris, France")))
        .with("Qwxzzznotaplace", None)
}

#[tokio::test]
async fn paris_resolves_to_geocoded_coordinate() {
    let geocoder = geocoder();
    let mut resolver = CoordinateResolver::new();
    resolver.edit_location("Paris, France");

    let ticket = resolver.resolve_on_commit().expect("lookup dispatched");
    assert_eq!(resolver.status(), ResolutionStatus::Searching);

    let outcome = geocoder.lookup(ticket.query().to_string()).await;
    assert!(resolver.apply_lookup(&ticket, outcome));

    assert_eq!(resolver.status(), ResolutionStatus::Found);
    assert_eq!(resolver.source(), CoordinateSource::Geocoded);
    assert_eq!(resolver.coordinate(), Coordinate::new(48.8566, 2.3522).unwrap());
    assert!(gate::can_submit(&resolver));
}

#[tokio::test]
async fn unknown_place_blocks_until_user_takes_over() {
    let geocoder = geocoder();
    let mut resolver = CoordinateResolver::new();
    resolver.edit_location("Qwxzzznotaplace");

    assert!(resolver.resolve_with(&geocoder).await);
    assert_eq!(resolver.status(), ResolutionStatus::NotFound);
    assert_eq!(resolver.source(), CoordinateSource::None);
    assert_eq!(resolver.coordinate(), Coordinate::UNSET);
    assert!(!gate::can_submit(&resolver));

    let mut map = MapSelectionChannel::new();
    map.open(resolver.coordinate());
    map.click_at(-33.8688, 151.2093);
    map.confirm(&mut resolver).expect("selection committed");

    assert!(gate::can_submit(&resolver));
    assert_eq!(resolver.source(), CoordinateSource::Manual);
    // Provenance of the failed lookup is gone; manual entry counts as resolved.
    assert_eq!(resolver.status(), ResolutionStatus::Found);
}

#[tokio::test]
async fn transport_failure_is_not_found() {
    let geocoder = geocoder();
    let mut resolver = CoordinateResolver::with_location("Atlantis");

    assert!(resolver.resolve_with(&geocoder).await);
    assert_eq!(resolver.status(), ResolutionStatus::NotFound);
    assert_eq!(resolver.coordinate(), Coordinate::UNSET);
}

#[tokio::test]
async fn repeated_commit_issues_one_lookup() {
    let geocoder = geocoder();
    let mut resolver = CoordinateResolver::with_location("Paris, France");

    let first = resolver.resolve_on_commit();
    let second = resolver.resolve_on_commit();
    assert!(first.is_some());
    assert!(second.is_none());

    for ticket in [first, second].into_iter().flatten() {
        let outcome = geocoder.lookup(ticket.query().to_string()).await;
        resolver.apply_lookup(&ticket, outcome);
    }
    assert_eq!(geocoder.calls(), 1);

    assert!(!resolver.resolve_with(&geocoder).await);
    assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn edit_during_flight_discards_the_late_answer() {
    let geocoder = Arc::new(ScriptedGeocoder {
        latency: Duration::from_millis(20),
        ..geocoder()
    });
    let mut resolver = CoordinateResolver::with_location("Paris, France");

    let ticket = resolver.resolve_on_commit().unwrap();
    let in_flight = {
        let geocoder = Arc::clone(&geocoder);
        let query = ticket.query().to_string();
        tokio::spawn(async move { geocoder.lookup(query).await })
    };

    resolver.edit_location("Paris, Texas");
    let outcome = in_flight.await.unwrap();

    assert!(!resolver.apply_lookup(&ticket, outcome));
    assert_eq!(resolver.status(), ResolutionStatus::Idle);
    assert_eq!(resolver.source(), CoordinateSource::None);
    assert_eq!(resolver.coordinate(), Coordinate::UNSET);
    assert_eq!(resolver.location_text(), "Paris, Texas");
}

#[tokio::test]
async fn map_confirm_during_flight_wins() {
    let geocoder = geocoder();
    let mut resolver = CoordinateResolver::with_location("Paris, France");
    let ticket = resolver.resolve_on_commit().unwrap();

    let mut map = MapSelectionChannel::new();
    map.open(resolver.coordinate());
    map.click_at(43.2965, 5.3698);
    map.confirm(&mut resolver).unwrap();

    let outcome = geocoder.lookup(ticket.query().to_string()).await;
    assert!(!resolver.apply_lookup(&ticket, outcome));
    assert_eq!(resolver.coordinate(), Coordinate::new(43.2965, 5.3698).unwrap());
    assert_eq!(resolver.source(), CoordinateSource::Manual);
}

#[test]
fn map_opened_without_coordinate_shows_the_world() {
    let mut map = MapSelectionChannel::new();
    assert_eq!(map.open(Coordinate::UNSET), MapView::global());
    assert_eq!(map.pending(), None);
}

#[tokio::test]
async fn manual_origin_reaches_the_chart_service() {
    let mut form = BirthForm::default();
    form.resolver.edit_location("Null Island");
    form.resolver.enter_manual_coordinate(0.0, 0.0).unwrap();

    let request = form.validate(false).expect("manual (0,0) passes the gate");
    assert_eq!(request.coordinate(), Coordinate::UNSET);

    let result = MockChartService::new(Duration::ZERO)
        .process(&request)
        .await
        .unwrap();
    assert_eq!(result.chart.birth_location, "Null Island");
}

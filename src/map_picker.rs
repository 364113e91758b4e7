//! One-shot coordinate selection on a map.
//!
//! Lifecycle is `Closed -> Open -> (confirm | cancel) -> Closed`. Clicks only
//! update the pending selection; nothing reaches the resolver until
//! [`MapSelectionChannel::confirm`].

use crate::models::Coordinate;
use crate::resolver::CoordinateResolver;
use tracing::{debug, warn};

pub const GLOBAL_ZOOM: u8 = 2;
pub const LOCAL_ZOOM: u8 = 10;
pub const MAX_ZOOM: u8 = 12;

/// Visible region of the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
}

impl MapView {
    /// Whole-world view used when there is nothing to center on.
    pub fn global() -> Self {
        Self {
            center: Coordinate::UNSET,
            zoom: GLOBAL_ZOOM,
        }
    }

    pub fn around(center: Coordinate) -> Self {
        Self {
            center,
            zoom: LOCAL_ZOOM,
        }
    }

    /// Half extents in degrees (longitude, latitude). Each zoom step halves them.
    pub fn half_span(&self) -> (f64, f64) {
        let scale = 2f64.powi(i32::from(self.zoom.saturating_sub(GLOBAL_ZOOM)));
        (180.0 / scale, 90.0 / scale)
    }

    /// Canvas bounds as `(x_bounds, y_bounds)`, i.e. longitude then latitude.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let (half_lon, half_lat) = self.half_span();
        (
            [self.center.longitude - half_lon, self.center.longitude + half_lon],
            [self.center.latitude - half_lat, self.center.latitude + half_lat],
        )
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(GLOBAL_ZOOM);
    }

    pub fn recenter(&mut self, center: Coordinate) {
        self.center = center;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
enum ChannelState {
    #[default]
    Closed,
    Open {
        view: MapView,
        pending: Option<Coordinate>,
    },
}

#[derive(Debug, Default)]
pub struct MapSelectionChannel {
    state: ChannelState,
}

impl MapSelectionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the picker seeded at `seed`.
    ///
    /// The unset sentinel opens a global view with nothing pending; any other
    /// seed centers on it and pre-selects it.
    pub fn open(&mut self, seed: Coordinate) -> MapView {
        let (view, pending) = if seed.is_unset() {
            (MapView::global(), None)
        } else {
            (MapView::around(seed), Some(seed))
        };
        debug!("Map picker opened at {:?}", view);
        self.state = ChannelState::Open { view, pending };
        view
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ChannelState::Open { .. })
    }

    pub fn view(&self) -> Option<MapView> {
        match &self.state {
            ChannelState::Open { view, .. } => Some(*view),
            ChannelState::Closed => None,
        }
    }

    pub fn view_mut(&mut self) -> Option<&mut MapView> {
        match &mut self.state {
            ChannelState::Open { view, .. } => Some(view),
            ChannelState::Closed => None,
        }
    }

    pub fn pending(&self) -> Option<Coordinate> {
        match &self.state {
            ChannelState::Open { pending, .. } => *pending,
            ChannelState::Closed => None,
        }
    }

    /// Records a click. Ignored while closed or for points off the globe.
    pub fn click_at(&mut self, latitude: f64, longitude: f64) -> bool {
        let ChannelState::Open { pending, .. } = &mut self.state else {
            return false;
        };
        match Coordinate::new(latitude, longitude) {
            Ok(coordinate) => {
                *pending = Some(coordinate);
                true
            }
            Err(e) => {
                warn!("Ignoring map click: {}", e);
                false
            }
        }
    }

    /// Hands the pending selection to the resolver and closes.
    ///
    /// With nothing pending the picker stays open and `None` is returned.
    pub fn confirm(&mut self, resolver: &mut CoordinateResolver) -> Option<Coordinate> {
        let selection = self.pending()?;
        resolver
            .select_from_map(selection.latitude, selection.longitude)
            .ok()?;
        self.state = ChannelState::Closed;
        Some(selection)
    }

    pub fn cancel(&mut self) {
        if self.is_open() {
            debug!("Map picker cancelled");
        }
        self.state = ChannelState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoordinateSource, ResolutionStatus};

    #[test]
    fn sentinel_seed_opens_global_view_with_nothing_pending() {
        let mut channel = MapSelectionChannel::new();
        let view = channel.open(Coordinate::UNSET);

        assert_eq!(view, MapView::global());
        assert_eq!(view.bounds(), ([-180.0, 180.0], [-90.0, 90.0]));
        assert_eq!(channel.pending(), None);
    }

    #[test]
    fn real_seed_centers_and_preselects() {
        let seed = Coordinate::new(51.5074, -0.1278).unwrap();
        let mut channel = MapSelectionChannel::new();
        let view = channel.open(seed);

        assert_eq!(view.center, seed);
        assert_eq!(view.zoom, LOCAL_ZOOM);
        assert_eq!(channel.pending(), Some(seed));
    }

    #[test]
    fn click_updates_pending_without_touching_resolver() {
        let mut resolver = CoordinateResolver::with_location("Paris");
        let mut channel = MapSelectionChannel::new();
        channel.open(resolver.coordinate());

        assert!(channel.click_at(48.8566, 2.3522));
        assert_eq!(channel.pending(), Some(Coordinate::new(48.8566, 2.3522).unwrap()));
        assert_eq!(resolver.source(), CoordinateSource::None);

        let confirmed = channel.confirm(&mut resolver);
        assert_eq!(confirmed, Some(Coordinate::new(48.8566, 2.3522).unwrap()));
        assert!(!channel.is_open());
        assert_eq!(resolver.source(), CoordinateSource::Manual);
        assert_eq!(resolver.status(), ResolutionStatus::Found);
    }

    #[test]
    fn confirm_without_selection_keeps_picker_open() {
        let mut resolver = CoordinateResolver::with_location("Paris");
        let mut channel = MapSelectionChannel::new();
        channel.open(Coordinate::UNSET);

        assert_eq!(channel.confirm(&mut resolver), None);
        assert!(channel.is_open());
        assert_eq!(resolver.source(), CoordinateSource::None);
    }

    #[test]
    fn cancel_discards_the_selection() {
        let mut resolver = CoordinateResolver::with_location("Paris");
        let mut channel = MapSelectionChannel::new();
        channel.open(Coordinate::UNSET);
        channel.click_at(10.0, 10.0);
        channel.cancel();

        assert!(!channel.is_open());
        assert_eq!(channel.pending(), None);
        assert_eq!(channel.confirm(&mut resolver), None);
        assert_eq!(resolver.coordinate(), Coordinate::UNSET);
    }

    #[test]
    fn clicks_while_closed_or_off_globe_are_ignored() {
        let mut channel = MapSelectionChannel::new();
        assert!(!channel.click_at(10.0, 10.0));

        channel.open(Coordinate::UNSET);
        assert!(!channel.click_at(95.0, 10.0));
        assert_eq!(channel.pending(), None);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = MapView::global();
        view.zoom_out();
        assert_eq!(view.zoom, GLOBAL_ZOOM);

        for _ in 0..20 {
            view.zoom_in();
        }
        assert_eq!(view.zoom, MAX_ZOOM);
        let (half_lon, half_lat) = view.half_span();
        assert!(half_lon < 1.0 && half_lat < 0.5);
    }
}

use crate::chart::{ChartRequest, ProcessFlowResult};
use crate::form::BirthForm;
use crate::map_picker::MapSelectionChannel;
use crate::models::{Coordinate, CoordinateAxis, CoordinateSource, GeocodeHit, ResolutionStatus};
use crate::resolver::LookupTicket;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, error};

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum Screen {
    #[default]
    Input,
    Processing,
    Display,
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum Field {
    #[default]
    Name,
    Date,
    Time,
    Location,
    Latitude,
    Longitude,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Date,
        Field::Time,
        Field::Location,
        Field::Latitude,
        Field::Longitude,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Date => "Birth Date (YYYY-MM-DD)",
            Field::Time => "Birth Time (HH:MM)",
            Field::Location => "Birth Location",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
        }
    }
}

/// Background work the event loop runs on behalf of the app.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Geocode(LookupTicket),
    Submit(ChartRequest),
}

const PARAM_COUNT: usize = 6;

/// Map surfaces report clicks to 4 decimal places.
pub fn round_to_surface_precision(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Default)]
pub struct App {
    pub screen: Screen,
    pub form: BirthForm,
    pub focus: Field,
    pub latitude_input: String,
    pub longitude_input: String,
    pub map: MapSelectionChannel,
    pub map_cursor: Coordinate,
    pub is_admin: bool,
    pub show_params: bool,
    pub param_index: usize,
    pub message: Option<String>,
    pub result: Option<ProcessFlowResult>,
    pub tick_count: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(is_admin: bool) -> Self {
        Self {
            is_admin,
            ..Self::default()
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.screen {
            Screen::Input if self.map.is_open() => {
                self.handle_map_key(key);
                None
            }
            Screen::Input => self.handle_form_key(key),
            // Nothing to do until the chart service answers.
            Screen::Processing => None,
            Screen::Display => {
                self.handle_display_key(key);
                None
            }
        }
    }

    pub fn on_geocode_finished(
        &mut self,
        ticket: LookupTicket,
        outcome: color_eyre::Result<Option<GeocodeHit>>,
    ) {
        if !self.form.resolver.apply_lookup(&ticket, outcome) {
            return;
        }
        self.sync_coordinate_inputs();

        self.message = match self.form.resolver.status() {
            ResolutionStatus::NotFound => Some(format!(
                "Could not find '{}'. Enter latitude/longitude or pick a point on the map (F2).",
                ticket.query()
            )),
            _ => None,
        };
    }

    pub fn on_chart_finished(&mut self, result: color_eyre::Result<ProcessFlowResult>) {
        match result {
            Ok(result) => {
                self.result = Some(result);
                self.screen = Screen::Display;
            }
            Err(e) => {
                error!("Chart processing failed: {}", e);
                self.message = Some(format!("Processing failed: {}", e));
                self.screen = Screen::Input;
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::F(2) => {
                self.open_map();
                None
            }
            KeyCode::Char('o') if ctrl => {
                self.open_map();
                None
            }
            KeyCode::F(3) if self.is_admin => {
                self.show_params = !self.show_params;
                None
            }
            KeyCode::F(4) if self.show_params => {
                self.param_index = (self.param_index + PARAM_COUNT - 1) % PARAM_COUNT;
                None
            }
            KeyCode::F(5) if self.show_params => {
                self.param_index = (self.param_index + 1) % PARAM_COUNT;
                None
            }
            KeyCode::Left if self.show_params => {
                self.cycle_param(false);
                None
            }
            KeyCode::Right if self.show_params => {
                self.cycle_param(true);
                None
            }
            KeyCode::Tab | KeyCode::Down => self.move_focus(Field::next),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(Field::prev),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.edit_focused(|s| {
                    s.pop();
                });
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.edit_focused(|s| s.push(c));
                None
            }
            _ => None,
        }
    }

    fn handle_map_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.map.cancel(),
            KeyCode::Enter => {
                if self.map.confirm(&mut self.form.resolver).is_some() {
                    self.sync_coordinate_inputs();
                    self.message = None;
                } else {
                    self.message = Some("Place a pin with Space before confirming.".to_string());
                }
            }
            KeyCode::Char(' ') => {
                let lat = round_to_surface_precision(self.map_cursor.latitude);
                let lon = round_to_surface_precision(self.map_cursor.longitude);
                self.map.click_at(lat, lon);
                self.message = None;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let cursor = self.map_cursor;
                if let Some(view) = self.map.view_mut() {
                    view.zoom_in();
                    view.recenter(cursor);
                }
            }
            KeyCode::Char('-') => {
                if let Some(view) = self.map.view_mut() {
                    view.zoom_out();
                }
            }
            KeyCode::Up => self.move_map_cursor(1.0, 0.0),
            KeyCode::Down => self.move_map_cursor(-1.0, 0.0),
            KeyCode::Left => self.move_map_cursor(0.0, -1.0),
            KeyCode::Right => self.move_map_cursor(0.0, 1.0),
            _ => {}
        }
    }

    fn handle_display_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Enter | KeyCode::Esc => self.reset(),
            _ => {}
        }
    }

    /// Back to a fresh form; the previous session is discarded.
    pub fn reset(&mut self) {
        self.screen = Screen::Input;
        self.result = None;
        self.message = None;
        self.focus = Field::Name;
        self.map.cancel();
        self.form.reset();
        self.sync_coordinate_inputs();
    }

    fn open_map(&mut self) {
        let view = self.map.open(self.form.resolver.coordinate());
        self.map_cursor = view.center;
    }

    fn move_map_cursor(&mut self, d_lat: f64, d_lon: f64) {
        let Some(view) = self.map.view() else {
            return;
        };
        let (half_lon, half_lat) = view.half_span();
        let cursor = Coordinate {
            latitude: (self.map_cursor.latitude + d_lat * half_lat / 10.0).clamp(-90.0, 90.0),
            longitude: (self.map_cursor.longitude + d_lon * half_lon / 10.0).clamp(-180.0, 180.0),
        };
        self.map_cursor = cursor;

        let ([x0, x1], [y0, y1]) = view.bounds();
        let outside = cursor.longitude < x0
            || cursor.longitude > x1
            || cursor.latitude < y0
            || cursor.latitude > y1;
        if outside {
            if let Some(view) = self.map.view_mut() {
                view.recenter(cursor);
            }
        }
    }

    fn move_focus(&mut self, step: fn(Field) -> Field) -> Option<Command> {
        let command = self.commit_field(self.focus);
        self.focus = step(self.focus);
        command
    }

    fn submit(&mut self) -> Option<Command> {
        self.message = None;
        if let Some(command) = self.commit_field(self.focus) {
            self.message = Some("Searching for location...".to_string());
            return Some(command);
        }
        if self.message.is_some() {
            return None;
        }

        match self.form.validate(self.is_admin) {
            Ok(request) => {
                debug!("Submitting chart request for '{}'", request.location);
                self.screen = Screen::Processing;
                self.result = None;
                Some(Command::Submit(request))
            }
            Err(e) => {
                self.message = Some(if self.form.resolver.status() == ResolutionStatus::Searching {
                    format!(
                        "Still searching for '{}', try again in a moment.",
                        self.form.resolver.location_text()
                    )
                } else {
                    e.to_string()
                });
                None
            }
        }
    }

    /// Runs the "user left this field" transition.
    fn commit_field(&mut self, field: Field) -> Option<Command> {
        match field {
            Field::Location => self.form.resolver.resolve_on_commit().map(Command::Geocode),
            Field::Latitude => {
                self.commit_coordinate_input(CoordinateAxis::Latitude);
                None
            }
            Field::Longitude => {
                self.commit_coordinate_input(CoordinateAxis::Longitude);
                None
            }
            Field::Name | Field::Date | Field::Time => None,
        }
    }

    fn commit_coordinate_input(&mut self, axis: CoordinateAxis) {
        let raw = self.coordinate_input(axis).trim().to_string();
        if raw.is_empty() {
            // Clearing a field does not unset the coordinate; show what will be submitted.
            self.sync_coordinate_inputs();
            return;
        }
        let Ok(value) = raw.parse::<f64>() else {
            self.message = Some(format!("{} must be a number, got '{}'", axis.label(), raw));
            return;
        };

        let resolver = &mut self.form.resolver;
        let result = if resolver.source() == CoordinateSource::None {
            // Both halves are needed before anything can be established.
            let lat = self.latitude_input.trim().parse::<f64>();
            let lon = self.longitude_input.trim().parse::<f64>();
            match (lat, lon) {
                (Ok(lat), Ok(lon)) => resolver.enter_manual_coordinate(lat, lon),
                _ => return,
            }
        } else {
            let current = match axis {
                CoordinateAxis::Latitude => resolver.coordinate().latitude,
                CoordinateAxis::Longitude => resolver.coordinate().longitude,
            };
            if raw == format_component(current) {
                return;
            }
            resolver.edit_coordinate_field(axis, value)
        };

        match result {
            Ok(()) => self.sync_coordinate_inputs(),
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn coordinate_input(&self, axis: CoordinateAxis) -> &str {
        match axis {
            CoordinateAxis::Latitude => &self.latitude_input,
            CoordinateAxis::Longitude => &self.longitude_input,
        }
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        self.message = None;
        match self.focus {
            Field::Name => edit(&mut self.form.name),
            Field::Date => edit(&mut self.form.date),
            Field::Time => edit(&mut self.form.time),
            Field::Location => {
                let mut text = self.form.resolver.location_text().to_string();
                edit(&mut text);
                if text != self.form.resolver.location_text() {
                    self.form.resolver.edit_location(text);
                    self.sync_coordinate_inputs();
                }
            }
            Field::Latitude => edit(&mut self.latitude_input),
            Field::Longitude => edit(&mut self.longitude_input),
        }
    }

    /// Mirrors the resolver's coordinate into the numeric inputs.
    fn sync_coordinate_inputs(&mut self) {
        match self.form.resolver.resolved() {
            Some(c) => {
                self.latitude_input = format_component(c.latitude);
                self.longitude_input = format_component(c.longitude);
            }
            None => {
                self.latitude_input.clear();
                self.longitude_input.clear();
            }
        }
    }

    /// Label/value pairs for the admin parameter panel.
    pub fn param_rows(&self) -> [(&'static str, String); PARAM_COUNT] {
        let p = &self.form.params;
        [
            ("House System", p.house_system.label().to_string()),
            ("Ephemeris Source", p.ephemeris_source.label().to_string()),
            ("Interpretation Engine", p.interpretation_engine.label().to_string()),
            ("Narrative Style", p.narrative_style.label().to_string()),
            ("AI Model", p.ai_model.label().to_string()),
            ("AI Temperature", format!("{:.1}", p.ai_temperature)),
        ]
    }

    fn cycle_param(&mut self, forward: bool) {
        let p = &mut self.form.params;
        match self.param_index {
            0 => p.house_system = p.house_system.cycle(forward),
            1 => p.ephemeris_source = p.ephemeris_source.cycle(),
            2 => p.interpretation_engine = p.interpretation_engine.cycle(forward),
            3 => p.narrative_style = p.narrative_style.cycle(forward),
            4 => p.ai_model = p.ai_model.cycle(forward),
            _ => {
                let step = if forward { 0.1 } else { -0.1 };
                p.ai_temperature = ((p.ai_temperature + step).clamp(0.0, 1.0) * 10.0).round() / 10.0;
            }
        }
    }
}

fn format_component(value: f64) -> String {
    format!("{:.4}", value)
}

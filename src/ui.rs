//! TUI rendering
//!
//! This module handles all UI rendering logic using the `ratatui` crate:
//! the birth-data form, the map picker overlay, the processing spinner and
//! the chart/narrative display.

use crate::app::{App, Field, Screen};
use crate::gate;
use crate::models::{CoordinateSource, ResolutionStatus};
use ratatui::{
    prelude::*,
    widgets::{canvas::*, *},
};

use ratatui::text::Line;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Renders one frame of the TUI based on current application state.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current application state.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    let title = if app.is_admin {
        " Lilith AI Admin Dashboard "
    } else {
        " Lilith AI Horoscope Synthesizer "
    };
    f.render_widget(
        Paragraph::new(title)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        chunks[0],
    );

    match app.screen {
        Screen::Input => render_input_view(f, app, chunks[1]),
        Screen::Processing => render_processing_view(f, app, chunks[1]),
        Screen::Display => render_display_view(f, app, chunks[1]),
    }

    f.render_widget(
        Paragraph::new(help_line(app))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[2],
    );

    if app.map.is_open() {
        render_map_picker(f, app);
    }
}

fn help_line(app: &App) -> &'static str {
    match app.screen {
        Screen::Input if app.map.is_open() => {
            " ←↑↓→ move   +/- zoom   Space place pin   Enter use coordinates   Esc cancel "
        }
        Screen::Input if app.is_admin => {
            " Tab/↑↓ fields   Enter submit   F2 map   F3 parameters   F4/F5 ←/→ edit parameter   Esc quit "
        }
        Screen::Input => " Tab/↑↓ fields   Enter submit   F2 pick on map   Esc quit ",
        Screen::Processing => " Ctrl+C quit ",
        Screen::Display => " r new chart   q quit ",
    }
}

/// Form view: fields, location status, optional parameter panel and the
/// validation banner.
fn render_input_view(f: &mut Frame, app: &App, area: Rect) {
    let params_height = if app.show_params { 8 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11),
            Constraint::Length(params_height),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let resolver = &app.form.resolver;
    let mut lines: Vec<Line> = Vec::with_capacity(Field::ALL.len() + 3);

    for field in Field::ALL {
        let value = match field {
            Field::Name => app.form.name.as_str(),
            Field::Date => app.form.date.as_str(),
            Field::Time => app.form.time.as_str(),
            Field::Location => resolver.location_text(),
            Field::Latitude => app.latitude_input.as_str(),
            Field::Longitude => app.longitude_input.as_str(),
        };
        lines.push(field_line(field.label(), value, field == app.focus));

        if field == Field::Location {
            lines.push(location_status_line(app));
            lines.push(Line::from(""));
        }
    }

    let ready = gate::can_submit(resolver);
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  SUBMIT: ", Style::default().add_modifier(Modifier::BOLD)),
        if ready {
            Span::styled("READY", Style::default().fg(Color::Green))
        } else {
            Span::styled("LOCATION UNRESOLVED", Style::default().fg(Color::Red))
        },
    ]));

    let form = Paragraph::new(lines).block(
        Block::default()
            .title(" Step 1: Input Birth Data ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(form, chunks[0]);

    if app.show_params {
        render_params_panel(f, app, chunks[1]);
    }

    if let Some(ref msg) = app.message {
        let banner = Paragraph::new(msg.as_str())
            .style(Style::default().fg(Color::Yellow))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP));
        f.render_widget(banner, chunks[2]);
    }
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .bg(Color::Rgb(30, 30, 60))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let cursor = if focused { "▏" } else { "" };

    Line::from(vec![
        Span::styled(format!("  {:<24}", label), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}{} ", value, cursor), style),
    ])
}

fn location_status_line(app: &App) -> Line<'static> {
    let resolver = &app.form.resolver;
    let spinner = SPINNER[app.tick_count % SPINNER.len()];

    let (text, color) = match (resolver.status(), resolver.source()) {
        (ResolutionStatus::Idle, _) => ("not resolved, leave the field to search".to_string(), Color::DarkGray),
        (ResolutionStatus::Searching, _) => (format!("{} searching...", spinner), Color::Cyan),
        (ResolutionStatus::Found, CoordinateSource::Manual) => {
            ("manual coordinate".to_string(), Color::Magenta)
        }
        (ResolutionStatus::Found, _) => (
            format!("found: {}", resolver.display_name().unwrap_or("(unnamed)")),
            Color::Green,
        ),
        (ResolutionStatus::NotFound, _) => (
            "not found, enter coordinates or press F2".to_string(),
            Color::Red,
        ),
    };

    Line::from(vec![
        Span::raw(format!("  {:<24} ", "")),
        Span::styled(text, Style::default().fg(color)),
    ])
}

fn render_params_panel(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<Line> = app
        .param_rows()
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == app.param_index {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(30, 30, 60))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("  {:<24} ", label), style),
                Span::styled(value, style),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(items).block(
            Block::default()
                .title(" AI/Calc Configuration ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

/// Map picker overlay: world outline, pending pin and the cursor crosshair.
fn render_map_picker(f: &mut Frame, app: &App) {
    let Some(view) = app.map.view() else {
        return;
    };
    let area = centered_rect(80, 80, f.size());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    let ([x0, x1], [y0, y1]) = view.bounds();
    let pending = app.map.pending();
    let cursor = app.map_cursor;

    let canvas = Canvas::default()
        .block(
            Block::bordered()
                .title(" Pick Coordinates on Map ")
                .border_type(BorderType::Rounded),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds([x0, x1])
        .y_bounds([y0, y1])
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(80, 80, 80),
                resolution: if view.zoom >= 5 {
                    MapResolution::High
                } else {
                    MapResolution::Low
                },
            });
            ctx.layer();

            if let Some(pin) = pending {
                ctx.print(
                    pin.longitude,
                    pin.latitude,
                    Line::from(Span::styled(
                        "●",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )),
                );
            }
            ctx.print(
                cursor.longitude,
                cursor.latitude,
                Line::from(Span::styled("+", Style::default().fg(Color::Cyan))),
            );
        });
    f.render_widget(canvas, chunks[0]);

    let selected = match pending {
        Some(p) => format!("Selected: Lat {:.4}, Lon {:.4}", p.latitude, p.longitude),
        None => "Selected: none".to_string(),
    };
    let info = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            format!(" Cursor: Lat {:.4}, Lon {:.4}", cursor.latitude, cursor.longitude),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  │  "),
        Span::styled(selected, Style::default().fg(Color::Yellow)),
        Span::raw(format!("  │  zoom {}", view.zoom)),
    ])])
    .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM));
    f.render_widget(info, chunks[1]);
}

fn render_processing_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let spinner = SPINNER[app.tick_count % SPINNER.len()];
    let msg = Paragraph::new(format!(
        "{} Calculating chart and synthesizing narrative...",
        spinner
    ))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(msg, chunks[1]);
}

/// Display view: chart summary (35%) + narrative (65%).
fn render_display_view(f: &mut Frame, app: &App, area: Rect) {
    let Some(ref result) = app.result else {
        f.render_widget(
            Paragraph::new("Error: Missing chart or narrative data.")
                .style(Style::default().fg(Color::Red)),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let chart = &result.chart;
    let mut chart_lines = vec![
        Line::from(vec![
            Span::styled("Born: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} {}", chart.birth_date, chart.birth_time)),
        ]),
        Line::from(vec![
            Span::styled("Place: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(chart.birth_location.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Houses: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(chart.house_system.as_str()),
        ]),
        Line::from(""),
    ];
    chart_lines.extend(chart.positions.iter().map(|p| {
        Line::from(format!("  {:<10} {:<8} {:>5.1}°", p.name, p.sign, p.degree))
    }));
    chart_lines.push(Line::from(""));
    chart_lines.extend(chart.aspects.iter().map(|a| {
        Line::from(format!("  {} {} {} (orb {:.1})", a.planet1, a.kind, a.planet2, a.orb))
    }));

    if let Some(ref steps) = result.processing_steps {
        chart_lines.push(Line::from(""));
        chart_lines.push(Line::from(Span::styled(
            "Processing",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        chart_lines.push(Line::from(format!(
            "  coords {:.4}, {:.4} ({})",
            steps.coordinates.latitude, steps.coordinates.longitude, steps.coordinates.timezone
        )));
        chart_lines.push(Line::from(format!(
            "  {} / {} / T={}",
            steps.pm_config.interpretation_engine, steps.pm_config.ai_model, steps.pm_config.temperature
        )));
    }

    f.render_widget(
        Paragraph::new(chart_lines).block(
            Block::default()
                .title(" Chart ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        ),
        chunks[0],
    );

    let narrative = &result.narrative;
    let mut text = vec![
        Line::from(Span::styled(
            narrative.title.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            narrative.summary.as_str(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    for section in &narrative.sections {
        text.push(Line::from(""));
        let mut heading = vec![Span::styled(
            section.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if app.is_admin {
            if let Some(ref id) = section.source_rule_or_prompt_id {
                heading.push(Span::styled(
                    format!(" [{}]", id),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        text.push(Line::from(heading));
        text.push(Line::from(section.content.as_str()));
    }

    f.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(" Narrative ")
                    .borders(Borders::ALL)
                    .padding(Padding::new(2, 2, 1, 1)),
            ),
        chunks[1],
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

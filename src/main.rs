use color_eyre::Result;
use lilith_intake::{
    api::{Geocoder, NominatimClient},
    app::{App, Command},
    chart::MockChartService,
    config::Config,
    events::{Event, EventHandler},
    logging, ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;
    install_panic_hook();

    let config = Config::load();
    let is_admin = config.ui.admin || std::env::args().any(|arg| arg == "--admin");
    info!("Starting intake (admin: {})", is_admin);

    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimClient::new(&config.geocoding)?);
    let chart_service = Arc::new(MockChartService::new(Duration::from_millis(
        config.chart.mock_delay_ms,
    )));

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(is_admin);
    let mut event_handler = EventHandler::new(config.ui.tick_rate_ms);

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(event) = event_handler.next().await {
            match event {
                Event::Tick => app.on_tick(),
                Event::Input(key) => {
                    if let Some(command) = app.handle_key(key) {
                        dispatch(command, &geocoder, &chart_service, &event_handler.tx);
                    }
                }
                Event::GeocodeFinished { ticket, outcome } => {
                    app.on_geocode_finished(ticket, outcome)
                }
                Event::ChartFinished(result) => app.on_chart_finished(result),
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Runs a command in the background and posts its completion back as an event.
fn dispatch(
    command: Command,
    geocoder: &Arc<dyn Geocoder>,
    chart_service: &Arc<MockChartService>,
    tx: &UnboundedSender<Event>,
) {
    let tx = tx.clone();
    match command {
        Command::Geocode(ticket) => {
            let geocoder = Arc::clone(geocoder);
            tokio::spawn(async move {
                let outcome = geocoder.lookup(ticket.query().trim().to_string()).await;
                let _ = tx.send(Event::GeocodeFinished { ticket, outcome });
            });
        }
        Command::Submit(request) => {
            let service = Arc::clone(chart_service);
            tokio::spawn(async move {
                let result = service.process(&request).await;
                let _ = tx.send(Event::ChartFinished(result));
            });
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}

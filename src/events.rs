//! Event types and the main event loop driver.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks, and the
//! completions of background geocoding and chart tasks) and the
//! [`EventHandler`], which runs a background task that polls crossterm for
//! key events and emits periodic [`Event::Tick`]s. Background tasks spawned
//! by `main.rs` post their results through [`EventHandler::tx`].

use crate::chart::ProcessFlowResult;
use crate::models::GeocodeHit;
use crate::resolver::LookupTicket;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
pub enum Event {
    /// Periodic tick used for UI refresh (spinner animation).
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// A geocoding lookup finished. The ticket is the one handed out by the
    /// resolver when the lookup was dispatched.
    GeocodeFinished {
        ticket: LookupTicket,
        outcome: color_eyre::Result<Option<GeocodeHit>>,
    },
    /// The chart service answered a submission.
    ChartFinished(color_eyre::Result<ProcessFlowResult>),
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// The sender ([`tx`](EventHandler::tx)) can be cloned and given to other
/// tasks, while the receiver is consumed by [`next`](EventHandler::next) in
/// the main loop.
pub struct EventHandler {
    /// Sender for posting events from background tasks.
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The spawned task polls crossterm with a timeout of `tick_rate_ms`;
    /// key presses become [`Event::Input`] and each elapsed interval becomes
    /// [`Event::Tick`]. If the terminal stops answering the task logs and
    /// exits, after which [`next`](EventHandler::next) only yields events
    /// from the remaining senders.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        // Windows reports releases too; only presses edit the form.
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            event_tx.send(Event::Input(key)).ok();
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    ///
    /// Returns `None` when all senders have been dropped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

//! Birth-data intake TUI.
//!
//! The interesting part is coordinate resolution: [`resolver`] turns the
//! free-text birth location into a latitude/longitude pair, reconciling
//! geocoding ([`api`]), manual entry and map picks ([`map_picker`]), and
//! [`gate`] decides whether the form may be submitted to the (mocked)
//! chart service in [`chart`].

pub mod api;
pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod events;
pub mod form;
pub mod gate;
pub mod logging;
pub mod map_picker;
pub mod models;
pub mod resolver;
pub mod ui;

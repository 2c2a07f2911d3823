//! Trendboard - a terminal dashboard for music-streaming trend analysis.
//!
//! This library exposes the core modules for the binary and for integration tests.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod headless;
pub mod logging;
pub mod reports;
pub mod session;
pub mod tui;

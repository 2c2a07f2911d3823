//! TUI widgets for Trendboard.

pub mod chart;
pub mod editor;
pub mod header;
pub mod login;
pub mod menu;
pub mod notice;
pub mod table;

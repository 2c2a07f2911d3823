//! Integration tests for Trendboard.

pub mod cli_test;
pub mod gate_test;
pub mod postgres_test;

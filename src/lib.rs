//! Benefit calculator for residential solar upgrades with energy-community incentives.

pub mod config;
/// Production, coverage, benefit aggregation and IRR.
pub mod engine;
pub mod error;
pub mod io;
pub mod report;
#[cfg(feature = "web")]
pub mod web;

//! Shared utilities for BoatDash.

pub mod logger;
pub mod time;

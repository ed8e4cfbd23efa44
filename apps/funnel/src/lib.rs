//! # funnel
//!
//! Application layer of the funnel metrics engine: CLI, HTTP API and
//! configuration around the pure `funnel-core` crate.

pub mod api;
pub mod cli;
pub mod config;

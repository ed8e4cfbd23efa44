//! # Formats Module
//!
//! Decoding of the external activity export.
//!
//! Opening files is the app's job; decoders here work on any reader.

mod csv_log;

pub use csv_log::*;

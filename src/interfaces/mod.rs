//! Host-facing adapters: scripted sessions over CSV and a channel-backed presentation layer.

pub mod console;
pub mod csv;

//! Timeline annotation: fuses scene metadata, asset catalogs, overlay
//! catalogs and subtitles into a draft edit plan.

pub mod aggregate;
pub mod broll;
pub mod cli;
pub mod coerce;
pub mod commands;
pub mod config;
pub mod cta;
pub mod error;
pub mod highlights;
pub mod model;
pub mod motion;
pub mod phrase;
pub mod pipeline;
pub mod sfx;
pub mod srt;
pub mod timing;

pub use cli::EnrichCommands;
pub use commands::handle_enrich_command;

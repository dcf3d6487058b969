//! memehub: command-line meme search across multiple sticker sources.
//!
//! The search itself lives in the `meme-search` crate. This crate adds the
//! front-end pieces around it:
//!
//! - [`config`]: TOML + environment configuration and log filter resolution
//! - [`output`]: terminal and JSON rendering of reports and source lists

pub mod config;
pub mod output;

pub use config::{AppConfig, SearchDefaults};

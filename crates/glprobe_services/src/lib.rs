//! Glprobe Services Layer
//!
//! Configuration input and result formatting around the probe core.

pub mod output;
pub mod settings;

pub use output::render;
pub use settings::{OutputSettings, Settings, SettingsError};

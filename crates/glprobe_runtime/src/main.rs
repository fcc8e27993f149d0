//! Glprobe Runtime
//!
//! Minimal binary: load settings, probe the OpenGL driver, print one line.
//! Usage: `glprobe [settings.json]`

use anyhow::{Context, Result};
use glprobe_services::Settings;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the result line.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    tracing::debug!("glprobe v{}", glprobe_core::VERSION);

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Settings::load(&path).context("loading settings")?,
        None => Settings::default(),
    };

    let ctx = settings.probe_context();
    let outcome = glprobe_render::probe_capabilities(settings.backend, &ctx);
    if let Err(err) = &outcome {
        tracing::info!(backend = %settings.backend, error = %err, "no OpenGL capabilities");
    }

    println!("{}", glprobe_services::render(&settings.output, &outcome));
    Ok(())
}

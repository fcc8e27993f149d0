//! Result formatting
//!
//! Turns a probe outcome into the single line printed for the user.

use crate::OutputSettings;
use glprobe_core::{GlString, ProbeOutcome};

/// Render `outcome` as `<key>: <value>`.
///
/// Without a template the value is the version string. Template
/// placeholders `{1}`..`{4}` follow [`GlString::QUERY_ORDER`]; anything
/// else is copied verbatim.
pub fn render(settings: &OutputSettings, outcome: &ProbeOutcome) -> String {
    let value = match (outcome, settings.format.as_deref()) {
        (Ok(result), None) => result.version().to_string(),
        (Ok(result), Some(template)) => {
            let mut text = template.to_string();
            for (index, name) in GlString::QUERY_ORDER.iter().enumerate() {
                text = text.replace(&format!("{{{}}}", index + 1), result.get(*name));
            }
            text
        }
        (Err(err), _) => err.to_string(),
    };
    format!("{}: {}", settings.key, value)
}

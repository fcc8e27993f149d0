//! Backend adapter contract
//!
//! An adapter owns one backend's acquisition chain. Everything it needs
//! from the outside world arrives through [`ProbeContext`].

use crate::{ProbeError, ProbeOutcome};
use glprobe_loader::candidate_names;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Backend selection value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Fallback across the compiled-in hardware backends
    #[default]
    Auto,
    /// EGL (first windowing-system API)
    Egl,
    /// GLX (second windowing-system API)
    Glx,
    /// OSMesa software rasterizer, explicit requests only
    OsMesa,
    /// CGL (macOS, statically linked)
    Cgl,
}

impl BackendKind {
    /// Attempt order in automatic mode. OSMesa is only ever probed on request.
    pub const AUTO_ORDER: [BackendKind; 3] = [BackendKind::Egl, BackendKind::Glx, BackendKind::Cgl];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Auto => "auto",
            BackendKind::Egl => "egl",
            BackendKind::Glx => "glx",
            BackendKind::OsMesa => "osmesa",
            BackendKind::Cgl => "cgl",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gl backend '{0}' (expected auto, egl, glx, osmesa or cgl)")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "egl" => Ok(BackendKind::Egl),
            "glx" => Ok(BackendKind::Glx),
            "osmesa" => Ok(BackendKind::OsMesa),
            "cgl" => Ok(BackendKind::Cgl),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

/// User-supplied library file names, tried before the platform defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryOverrides {
    pub egl: Option<String>,
    pub glx: Option<String>,
    pub osmesa: Option<String>,
}

impl LibraryOverrides {
    pub fn get(&self, backend: BackendKind) -> Option<&str> {
        match backend {
            BackendKind::Egl => self.egl.as_deref(),
            BackendKind::Glx => self.glx.as_deref(),
            BackendKind::OsMesa => self.osmesa.as_deref(),
            BackendKind::Auto | BackendKind::Cgl => None,
        }
    }
}

/// Explicit per-run state handed to the selector and every adapter.
#[derive(Debug, Clone, Default)]
pub struct ProbeContext {
    libraries: LibraryOverrides,
}

impl ProbeContext {
    pub fn new(libraries: LibraryOverrides) -> Self {
        Self { libraries }
    }

    pub fn libraries(&self) -> &LibraryOverrides {
        &self.libraries
    }

    /// File names to try for `backend`: the override first, then the
    /// platform names derived from `stem`.
    pub fn library_candidates(&self, backend: BackendKind, stem: &str, max_version: u32) -> Vec<String> {
        let mut names: Vec<String> = self
            .libraries
            .get(backend)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .into_iter()
            .collect();

        for name in candidate_names(stem, max_version) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// One backend's capability probe.
pub trait Adapter {
    fn kind(&self) -> BackendKind;

    /// Run the full chain. Every resource the chain acquired is released
    /// before this returns.
    fn probe(&self, ctx: &ProbeContext) -> ProbeOutcome;
}

/// Opens the native API an adapter drives.
///
/// For library-loaded backends this is step 1 of the chain: load the
/// library and bind its entry points. Dropping the returned API unloads
/// the library, so it is the last thing released.
pub trait ApiProvider {
    type Api;

    fn open(&self, ctx: &ProbeContext) -> Result<Self::Api, ProbeError>;
}

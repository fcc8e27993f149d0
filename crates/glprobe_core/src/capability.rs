//! Driver capability strings
//!
//! Every backend ends its chain by asking `glGetString` for the same four
//! values; only the way it obtains `glGetString` differs.

use crate::{ProbeError, ProbeOutcome};
use serde::Serialize;
use std::ffi::{c_uchar, CStr};
use tracing::debug;

/// `glGetString` selectors, in the order the probe queries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlString {
    Version,
    Renderer,
    Vendor,
    ShadingLanguageVersion,
}

impl GlString {
    pub const QUERY_ORDER: [GlString; 4] = [
        GlString::Version,
        GlString::Renderer,
        GlString::Vendor,
        GlString::ShadingLanguageVersion,
    ];

    /// GLenum value passed to `glGetString`.
    pub fn code(self) -> u32 {
        match self {
            GlString::Vendor => 0x1F00,
            GlString::Renderer => 0x1F01,
            GlString::Version => 0x1F02,
            GlString::ShadingLanguageVersion => 0x8B8C,
        }
    }

    /// The call as it appears in error messages.
    pub fn call(self) -> &'static str {
        match self {
            GlString::Vendor => "glGetString(GL_VENDOR)",
            GlString::Renderer => "glGetString(GL_RENDERER)",
            GlString::Version => "glGetString(GL_VERSION)",
            GlString::ShadingLanguageVersion => "glGetString(GL_SHADING_LANGUAGE_VERSION)",
        }
    }
}

/// Source of capability strings once a context is current.
pub trait GlStrings {
    /// `None` when the driver answers with a null pointer.
    fn get_string(&self, name: GlString) -> Option<String>;
}

pub type GlGetStringFn = unsafe extern "C" fn(u32) -> *const c_uchar;

/// A resolved `glGetString` entry point.
#[derive(Clone, Copy)]
pub struct GetString(GlGetStringFn);

impl GetString {
    /// # Safety
    ///
    /// `function` must be a real `glGetString`, and [`GlStrings::get_string`]
    /// may only be called while a context is current on this thread and the
    /// library that provided `function` is still loaded.
    pub unsafe fn new(function: GlGetStringFn) -> Self {
        Self(function)
    }
}

impl GlStrings for GetString {
    fn get_string(&self, name: GlString) -> Option<String> {
        // SAFETY: upheld by the contract of `GetString::new`.
        let raw = unsafe { (self.0)(name.code()) };
        if raw.is_null() {
            return None;
        }
        // SAFETY: glGetString returns a static NUL-terminated string.
        let text = unsafe { CStr::from_ptr(raw.cast()) };
        Some(text.to_string_lossy().into_owned())
    }
}

/// The four strings a driver reports. All of them are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityResult {
    vendor: String,
    renderer: String,
    version: String,
    shading_language_version: String,
}

impl CapabilityResult {
    /// Build a result, rejecting the first empty string in query order.
    pub fn new(
        version: impl Into<String>,
        renderer: impl Into<String>,
        vendor: impl Into<String>,
        shading_language_version: impl Into<String>,
    ) -> Result<Self, ProbeError> {
        let result = Self {
            vendor: vendor.into(),
            renderer: renderer.into(),
            version: version.into(),
            shading_language_version: shading_language_version.into(),
        };

        for name in GlString::QUERY_ORDER {
            if result.get(name).is_empty() {
                return Err(ProbeError::native(name.call(), "NULL"));
            }
        }
        Ok(result)
    }

    pub fn get(&self, name: GlString) -> &str {
        match name {
            GlString::Version => &self.version,
            GlString::Renderer => &self.renderer,
            GlString::Vendor => &self.vendor,
            GlString::ShadingLanguageVersion => &self.shading_language_version,
        }
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn shading_language_version(&self) -> &str {
        &self.shading_language_version
    }
}

/// Query all four strings, stopping at the first null or empty answer.
pub fn query_capabilities<S: GlStrings + ?Sized>(strings: &S) -> ProbeOutcome {
    let fetch = |name: GlString| {
        strings
            .get_string(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ProbeError::native(name.call(), "NULL"))
    };

    let version = fetch(GlString::Version)?;
    let renderer = fetch(GlString::Renderer)?;
    let vendor = fetch(GlString::Vendor)?;
    let shading_language_version = fetch(GlString::ShadingLanguageVersion)?;
    debug!(%version, %renderer, %vendor, "driver reported capability strings");

    CapabilityResult::new(version, renderer, vendor, shading_language_version)
}

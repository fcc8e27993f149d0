//! Glprobe Render Backends
//!
//! OpenGL context backends with automatic selection and fallbacks.
//! Each backend module exposes its native API as a trait, the generic
//! acquisition chain over that trait, and the real binding.

pub mod backend;
pub mod cgl;
#[cfg(feature = "egl")]
pub mod egl;
#[cfg(feature = "glx")]
pub mod glx;
#[cfg(feature = "osmesa")]
pub mod osmesa;

#[cfg(test)]
mod testing;

pub use backend::{compiled_backends, default_adapters, probe_capabilities};
pub use glprobe_core;

//! Glprobe Core
//!
//! Backend-independent half of the OpenGL capability probe:
//! - Capability strings and the probe outcome
//! - Error taxonomy shared by every backend
//! - Scoped acquire/release pipeline for native resources
//! - Adapter contract and the backend selector

pub mod adapter;
pub mod capability;
pub mod error;
pub mod pipeline;
pub mod selector;

pub use adapter::{Adapter, ApiProvider, BackendKind, LibraryOverrides, ProbeContext, UnknownBackend};
pub use capability::{query_capabilities, CapabilityResult, GetString, GlString, GlStrings};
pub use error::{ProbeError, ProbeOutcome};
pub use selector::select;

/// Probe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Off-screen drawables are 1x1; nothing is ever read back.
pub const DRAWABLE_WIDTH: i32 = 1;
pub const DRAWABLE_HEIGHT: i32 = 1;

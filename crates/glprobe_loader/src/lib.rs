//! Glprobe Library Loader
//!
//! Opens graphics driver libraries at runtime and binds their entry points
//! into typed function-pointer tables:
//! - Candidate file names tried in platform priority order
//! - Up-front symbol resolution that fails on the first missing entry point
//! - Idempotent unload, also performed on drop

pub mod error;
pub mod library;
pub mod macros;
pub mod names;

pub use error::LoadError;
pub use library::LibraryHandle;
pub use names::candidate_names;

use crate::{BackendKind, CapabilityResult};
use glprobe_loader::LoadError;
use std::borrow::Cow;
use thiserror::Error;

/// What a probe yields: the four capability strings or the reason it stopped.
pub type ProbeOutcome = Result<CapabilityResult, ProbeError>;

/// Errors that can end a capability probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The backend library did not open, or lacks a required entry point.
    #[error(transparent)]
    Library(#[from] LoadError),

    /// A native call returned its failure sentinel.
    #[error("{call} returned {sentinel}")]
    NativeCall {
        call: Cow<'static, str>,
        sentinel: Cow<'static, str>,
    },

    #[error("built without {backend} support")]
    NotCompiled { backend: BackendKind },

    #[error("built without gl support")]
    NoBackend,
}

impl ProbeError {
    pub fn native(
        call: impl Into<Cow<'static, str>>,
        sentinel: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::NativeCall {
            call: call.into(),
            sentinel: sentinel.into(),
        }
    }
}

//! Rendering backend registry
//!
//! Which adapters this build carries, and the probe entry point.

use glprobe_core::{select, Adapter, BackendKind, ProbeContext, ProbeOutcome};
use tracing::debug;

/// The adapters compiled into this build.
///
/// macOS carries only CGL. Elsewhere each library-loaded backend is
/// present when its cargo feature is enabled.
#[allow(unused_mut)]
pub fn default_adapters() -> Vec<Box<dyn Adapter>> {
    let mut adapters: Vec<Box<dyn Adapter>> = Vec::new();

    #[cfg(target_os = "macos")]
    adapters.push(Box::new(crate::cgl::CglAdapter::new()));

    #[cfg(all(feature = "egl", not(target_os = "macos")))]
    adapters.push(Box::new(crate::egl::EglAdapter::new()));

    #[cfg(all(feature = "glx", not(target_os = "macos")))]
    adapters.push(Box::new(crate::glx::GlxAdapter::new()));

    #[cfg(all(feature = "osmesa", not(target_os = "macos")))]
    adapters.push(Box::new(crate::osmesa::OsMesaAdapter::new()));

    adapters
}

pub fn compiled_backends() -> Vec<BackendKind> {
    default_adapters().iter().map(|adapter| adapter.kind()).collect()
}

/// Probe capabilities with the compiled-in adapters.
pub fn probe_capabilities(kind: BackendKind, ctx: &ProbeContext) -> ProbeOutcome {
    let adapters = default_adapters();
    debug!(requested = %kind, compiled = ?compiled_backends(), "selecting gl backend");
    select(kind, &adapters, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "macos")]
    #[test]
    fn test_macos_carries_only_cgl() {
        assert_eq!(compiled_backends(), vec![BackendKind::Cgl]);
    }

    #[cfg(all(not(target_os = "macos"), feature = "egl", feature = "glx", feature = "osmesa"))]
    #[test]
    fn test_default_features_carry_library_backends() {
        assert_eq!(
            compiled_backends(),
            vec![BackendKind::Egl, BackendKind::Glx, BackendKind::OsMesa]
        );
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_cgl_is_not_compiled_off_macos() {
        let err = probe_capabilities(BackendKind::Cgl, &ProbeContext::default()).unwrap_err();
        assert_eq!(err.to_string(), "built without cgl support");
    }
}

#[cfg(all(test, feature = "egl", feature = "glx", feature = "osmesa"))]
mod scenarios {
    use crate::egl::EglAdapter;
    use crate::glx::GlxAdapter;
    use crate::osmesa::OsMesaAdapter;
    use crate::testing::{CallLog, MockProvider};
    use glprobe_core::{select, Adapter, BackendKind, ProbeContext, ProbeError};
    use std::rc::Rc;

    struct Logs {
        egl: Rc<CallLog>,
        glx: Rc<CallLog>,
        osmesa: Rc<CallLog>,
    }

    fn adapters(logs: &Logs) -> Vec<Box<dyn Adapter>> {
        vec![
            Box::new(EglAdapter::with_provider(MockProvider::new(&logs.egl))),
            Box::new(GlxAdapter::with_provider(MockProvider::new(&logs.glx))),
            Box::new(OsMesaAdapter::with_provider(MockProvider::new(&logs.osmesa))),
        ]
    }

    #[test]
    fn test_explicit_glx_display_failure() {
        let logs = Logs {
            egl: CallLog::new("egl", None),
            glx: CallLog::new("glx", Some("XOpenDisplay")),
            osmesa: CallLog::new("osmesa", None),
        };

        let err = select(BackendKind::Glx, &adapters(&logs), &ProbeContext::default()).unwrap_err();

        assert_eq!(err, ProbeError::native("XOpenDisplay", "NULL"));
        let calls = logs.glx.calls();
        assert!(!calls.contains(&"glXDestroyContext"));
        assert!(!calls.contains(&"glXDestroyGLXPixmap"));
        assert!(!calls.contains(&"XFreePixmap"));
        assert_eq!(calls.last(), Some(&"unload"));
        assert!(logs.egl.calls().is_empty());
    }

    #[test]
    fn test_auto_falls_back_from_missing_egl_to_glx() {
        let logs = Logs {
            egl: CallLog::new("egl", Some("open")),
            glx: CallLog::new("glx", None),
            osmesa: CallLog::new("osmesa", None),
        };

        let result = select(BackendKind::Auto, &adapters(&logs), &ProbeContext::default()).unwrap();

        assert_eq!(result.renderer(), "glx Renderer");
        assert_eq!(result.version(), "glx Version");
        assert_eq!(logs.egl.calls(), vec!["open"]);
        assert!(logs.osmesa.calls().is_empty());
    }

    #[test]
    fn test_auto_returns_last_error_when_all_fail() {
        let logs = Logs {
            egl: CallLog::new("egl", Some("eglGetDisplay")),
            glx: CallLog::new("glx", Some("glXChooseVisual")),
            osmesa: CallLog::new("osmesa", None),
        };

        let err = select(BackendKind::Auto, &adapters(&logs), &ProbeContext::default()).unwrap_err();

        assert_eq!(err.to_string(), "glXChooseVisual returned NULL");
        assert!(logs.osmesa.calls().is_empty());
    }

    #[test]
    fn test_explicit_osmesa_succeeds() {
        let logs = Logs {
            egl: CallLog::new("egl", None),
            glx: CallLog::new("glx", None),
            osmesa: CallLog::new("osmesa", None),
        };

        let result = select(BackendKind::OsMesa, &adapters(&logs), &ProbeContext::default()).unwrap();

        assert_eq!(result.vendor(), "osmesa Vendor");
        assert!(logs.egl.calls().is_empty());
        assert!(logs.glx.calls().is_empty());
    }

    #[test]
    fn test_explicit_backend_missing_from_build_loads_nothing() {
        let logs = Logs {
            egl: CallLog::new("egl", None),
            glx: CallLog::new("glx", None),
            osmesa: CallLog::new("osmesa", None),
        };
        let only_egl: Vec<Box<dyn Adapter>> =
            vec![Box::new(EglAdapter::with_provider(MockProvider::new(&logs.egl)))];

        let err = select(BackendKind::Glx, &only_egl, &ProbeContext::default()).unwrap_err();

        assert_eq!(err, ProbeError::NotCompiled { backend: BackendKind::Glx });
        assert!(logs.egl.calls().is_empty());
    }
}

//! Backend selection
//!
//! Explicit requests run exactly one adapter. Automatic mode walks
//! [`BackendKind::AUTO_ORDER`] over the adapters compiled into the build
//! and stops at the first success.

use crate::{Adapter, BackendKind, ProbeContext, ProbeError, ProbeOutcome};
use tracing::{debug, info};

/// Probe with the adapter(s) chosen by `kind`.
///
/// `adapters` is the compiled-in set. An explicit backend missing from it
/// fails with [`ProbeError::NotCompiled`] before anything native runs. In
/// automatic mode the last adapter error is returned when all of them fail.
pub fn select(kind: BackendKind, adapters: &[Box<dyn Adapter>], ctx: &ProbeContext) -> ProbeOutcome {
    if kind == BackendKind::Auto {
        return select_automatic(adapters, ctx);
    }

    match find(adapters, kind) {
        Some(adapter) => {
            debug!(backend = %kind, "probing explicitly requested backend");
            adapter.probe(ctx)
        }
        None => Err(ProbeError::NotCompiled { backend: kind }),
    }
}

fn select_automatic(adapters: &[Box<dyn Adapter>], ctx: &ProbeContext) -> ProbeOutcome {
    let mut last_error = None;

    for kind in BackendKind::AUTO_ORDER {
        let Some(adapter) = find(adapters, kind) else {
            continue;
        };

        debug!(backend = %kind, "trying backend");
        match adapter.probe(ctx) {
            Ok(result) => {
                info!(backend = %kind, renderer = result.renderer(), "backend probe succeeded");
                return Ok(result);
            }
            Err(err) => {
                debug!(backend = %kind, error = %err, "backend probe failed");
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or(ProbeError::NoBackend))
}

fn find(adapters: &[Box<dyn Adapter>], kind: BackendKind) -> Option<&dyn Adapter> {
    adapters
        .iter()
        .find(|adapter| adapter.kind() == kind)
        .map(|adapter| adapter.as_ref())
}

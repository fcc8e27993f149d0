//! Scoped acquisition chain for native resources
//!
//! Each acquisition step wraps its handle in a [`Scoped`] guard holding the
//! matching release call. Guards are plain locals, so they drop in reverse
//! declaration order on every exit path, including `?` returns: a chain
//! that stops at step *k* releases steps *k-1 .. 1* and nothing else.

use crate::ProbeError;
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, trace};

/// A live native resource and the call that releases it.
pub struct Scoped<T: Copy, F: FnOnce(T)> {
    label: &'static str,
    value: T,
    release: Option<F>,
}

impl<T: Copy, F: FnOnce(T)> Scoped<T, F> {
    pub fn new(label: &'static str, value: T, release: F) -> Self {
        Self {
            label,
            value,
            release: Some(release),
        }
    }

    #[inline]
    pub fn get(&self) -> T {
        self.value
    }
}

impl<T: Copy, F: FnOnce(T)> Drop for Scoped<T, F> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            trace!(resource = self.label, "releasing");
            release(self.value);
        }
    }
}

/// Run one acquisition step.
///
/// `None` is the call's failure sentinel; it becomes
/// [`ProbeError::NativeCall`] naming `call` and `sentinel`, and `release`
/// is never invoked.
pub fn acquire<T: Copy, F: FnOnce(T)>(
    call: &'static str,
    handle: Option<T>,
    sentinel: impl Into<Cow<'static, str>>,
    release: F,
) -> Result<Scoped<T, F>, ProbeError> {
    match handle {
        Some(value) => {
            debug!(call, "acquired");
            Ok(Scoped::new(call, value, release))
        }
        None => Err(ProbeError::native(call, sentinel)),
    }
}

/// Check a step that acquires nothing, such as binding an API or making a
/// context current.
pub fn ensure(
    call: &'static str,
    succeeded: bool,
    sentinel: impl Into<Cow<'static, str>>,
) -> Result<(), ProbeError> {
    if succeeded {
        debug!(call, "succeeded");
        Ok(())
    } else {
        Err(ProbeError::native(call, sentinel))
    }
}

/// [`acquire`] for APIs that report a status code instead of a null handle.
/// The error's `Display` is used as the sentinel.
pub fn acquire_status<T: Copy, E: fmt::Display, F: FnOnce(T)>(
    call: &'static str,
    status: Result<T, E>,
    release: F,
) -> Result<Scoped<T, F>, ProbeError> {
    match status {
        Ok(value) => {
            debug!(call, "acquired");
            Ok(Scoped::new(call, value, release))
        }
        Err(err) => Err(ProbeError::native(call, err.to_string())),
    }
}

/// [`ensure`] for APIs that report a status code.
pub fn ensure_status<E: fmt::Display>(call: &'static str, status: Result<(), E>) -> Result<(), ProbeError> {
    match status {
        Ok(()) => {
            debug!(call, "succeeded");
            Ok(())
        }
        Err(err) => Err(ProbeError::native(call, err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn chain(log: &RefCell<Vec<&'static str>>, fail_third: bool) -> Result<u32, ProbeError> {
        let first = acquire("first", Some(1u32), "NULL", |_| log.borrow_mut().push("release first"))?;
        let second = acquire("second", Some(2u32), "NULL", |_| log.borrow_mut().push("release second"))?;
        let third = acquire(
            "third",
            if fail_third { None } else { Some(3u32) },
            "NULL",
            |_| log.borrow_mut().push("release third"),
        )?;
        log.borrow_mut().push("use");
        Ok(first.get() + second.get() + third.get())
    }

    #[test]
    fn test_releases_in_reverse_order() {
        let log = RefCell::new(Vec::new());
        assert_eq!(chain(&log, false).unwrap(), 6);
        assert_eq!(
            *log.borrow(),
            vec!["use", "release third", "release second", "release first"]
        );
    }

    #[test]
    fn test_failed_step_releases_only_earlier_steps() {
        let log = RefCell::new(Vec::new());
        let err = chain(&log, true).unwrap_err();
        assert_eq!(err.to_string(), "third returned NULL");
        assert_eq!(*log.borrow(), vec!["release second", "release first"]);
    }

    #[test]
    fn test_status_errors_become_sentinels() {
        let released = RefCell::new(false);
        let failed = acquire_status("CGLCreateContext", Err::<u8, _>("kCGLBadAlloc"), |_| {
            *released.borrow_mut() = true
        });
        assert_eq!(
            failed.err(),
            Some(ProbeError::native("CGLCreateContext", "kCGLBadAlloc"))
        );
        assert!(!*released.borrow());

        let held = acquire_status("CGLCreateContext", Ok::<u8, &str>(7), |_| *released.borrow_mut() = true).unwrap();
        assert_eq!(held.get(), 7);
        drop(held);
        assert!(*released.borrow());

        assert!(ensure_status("CGLSetCurrentContext", Ok::<(), &str>(())).is_ok());
        assert_eq!(
            ensure_status("CGLSetCurrentContext", Err("kCGLBadContext")).unwrap_err().to_string(),
            "CGLSetCurrentContext returned kCGLBadContext"
        );
    }

    #[test]
    fn test_ensure_reports_sentinel() {
        assert!(ensure("eglBindAPI", true, "EGL_FALSE").is_ok());
        assert_eq!(
            ensure("eglBindAPI", false, "EGL_FALSE").unwrap_err(),
            ProbeError::native("eglBindAPI", "EGL_FALSE")
        );
    }
}

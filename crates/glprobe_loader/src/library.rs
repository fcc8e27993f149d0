//! Owned handle to a dynamically opened shared library

use crate::LoadError;
use libloading::Library;
use tracing::{debug, warn};

/// An opened shared library.
///
/// The handle is released exactly once: either by an explicit [`unload`]
/// or when the value is dropped. Function pointers resolved from it must
/// not outlive it, which the binding tables generated by
/// [`bindings!`](crate::bindings) guarantee by owning the handle.
///
/// [`unload`]: LibraryHandle::unload
pub struct LibraryHandle {
    name: String,
    library: Option<Library>,
}

impl LibraryHandle {
    /// Open the first candidate that loads.
    pub fn load<I, S>(candidates: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tried = Vec::new();

        for candidate in candidates {
            let candidate = candidate.as_ref();
            // SAFETY: graphics driver libraries have no load-time
            // initializers with preconditions we could violate here.
            match unsafe { Library::new(candidate) } {
                Ok(library) => {
                    debug!(library = candidate, "opened shared library");
                    return Ok(Self {
                        name: candidate.to_owned(),
                        library: Some(library),
                    });
                }
                Err(err) => {
                    debug!(library = candidate, error = %err, "candidate did not open");
                    tried.push(candidate.to_owned());
                }
            }
        }

        Err(LoadError::Open { tried })
    }

    /// File name of the candidate that opened.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.library.is_some()
    }

    /// Resolve `symbol` as a value of type `T`, normally a function pointer.
    ///
    /// # Safety
    ///
    /// `T` must match the actual type of the exported symbol, and the
    /// returned value must not be used after this handle is unloaded.
    pub unsafe fn resolve<T: Copy>(&self, symbol: &str) -> Result<T, LoadError> {
        let missing = || LoadError::Symbol {
            library: self.name.clone(),
            symbol: symbol.to_owned(),
        };

        let library = self.library.as_ref().ok_or_else(missing)?;
        match library.get::<T>(symbol.as_bytes()) {
            Ok(resolved) => Ok(*resolved),
            Err(err) => {
                debug!(library = %self.name, symbol, error = %err, "symbol lookup failed");
                Err(missing())
            }
        }
    }

    /// Close the library. Calling this again, or dropping afterwards, is a no-op.
    pub fn unload(&mut self) {
        if let Some(library) = self.library.take() {
            match library.close() {
                Ok(()) => debug!(library = %self.name, "closed shared library"),
                Err(err) => warn!(library = %self.name, error = %err, "dlclose reported an error"),
            }
        }
    }
}

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        self.unload();
    }
}

impl std::fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

//! Typed entry-point tables

/// Declare a table of function pointers resolved from a [`LibraryHandle`].
///
/// Field names are the exported symbol names. The generated `resolve`
/// binds every field up front and returns the first
/// [`LoadError::Symbol`] it hits, so a table either exists complete or
/// not at all.
///
/// # Examples
///
/// ```ignore
/// glprobe_loader::bindings! {
///     pub struct OsMesaFns {
///         OSMesaCreateContext: unsafe extern "C" fn(u32, *mut c_void) -> *mut c_void,
///         OSMesaDestroyContext: unsafe extern "C" fn(*mut c_void),
///     }
/// }
///
/// let library = LibraryHandle::load(candidate_names("libOSMesa", 8))?;
/// let fns = unsafe { OsMesaFns::resolve(&library)? };
/// ```
///
/// [`LibraryHandle`]: crate::LibraryHandle
/// [`LoadError::Symbol`]: crate::LoadError::Symbol
#[macro_export]
macro_rules! bindings {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $symbol:ident : $ty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[allow(non_snake_case)]
        #[derive(Clone, Copy)]
        $vis struct $name {
            $( pub $symbol: $ty, )+
        }

        impl $name {
            /// Resolve every entry point of the table.
            ///
            /// # Safety
            ///
            /// Each field type must match the C signature of the symbol it
            /// names, and the table must not be used after `library` unloads.
            $vis unsafe fn resolve(
                library: &$crate::LibraryHandle,
            ) -> ::std::result::Result<Self, $crate::LoadError> {
                Ok(Self {
                    $( $symbol: library.resolve::<$ty>(stringify!($symbol))?, )+
                })
            }
        }
    };
}

//! CGL backend
//!
//! macOS links the OpenGL framework directly, so this adapter has no
//! library to open and `glGetString` is an ordinary import. Pixel format
//! selection is left to `CGLChoosePixelFormat`.

use glprobe_core::pipeline::{acquire_status, ensure_status};
use glprobe_core::{query_capabilities, Adapter, BackendKind, GlStrings, ProbeContext, ProbeOutcome};
use std::ffi::{c_int, c_void};
use std::fmt;
use std::ptr::NonNull;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CglPixelFormat(pub NonNull<c_void>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CglContext(pub NonNull<c_void>);

/// A non-`kCGLNoError` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CglError(pub c_int);

impl CglError {
    pub const BAD_PIXEL_FORMAT: CglError = CglError(10002);
    pub const BAD_CONTEXT: CglError = CglError(10004);
}

impl fmt::Display for CglError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            10000 => "kCGLBadAttribute",
            10001 => "kCGLBadProperty",
            10002 => "kCGLBadPixelFormat",
            10003 => "kCGLBadRendererInfo",
            10004 => "kCGLBadContext",
            10005 => "kCGLBadDrawable",
            10006 => "kCGLBadDisplay",
            10007 => "kCGLBadState",
            10008 => "kCGLBadValue",
            10009 => "kCGLBadMatch",
            10016 => "kCGLBadAlloc",
            10017 => "kCGLBadConnection",
            code => return write!(f, "CGLError {code}"),
        };
        f.write_str(name)
    }
}

/// The slice of CGL the probe drives.
pub trait CglApi {
    type Strings: GlStrings;

    fn gl_strings(&self) -> Self::Strings;
    /// Accelerated 3.2 core profile format.
    fn choose_pixel_format(&self) -> Result<CglPixelFormat, CglError>;
    fn destroy_pixel_format(&self, pixel_format: CglPixelFormat);
    fn create_context(&self, pixel_format: CglPixelFormat) -> Result<CglContext, CglError>;
    fn destroy_context(&self, context: CglContext);
    fn set_current_context(&self, context: CglContext) -> Result<(), CglError>;
}

/// Choose a pixel format, create and bind a context, query the strings, release.
pub fn probe_chain<A: CglApi>(api: &A) -> ProbeOutcome {
    let pixel_format = acquire_status("CGLChoosePixelFormat", api.choose_pixel_format(), |pixel_format| {
        api.destroy_pixel_format(pixel_format)
    })?;

    let context = acquire_status("CGLCreateContext", api.create_context(pixel_format.get()), |context| {
        api.destroy_context(context)
    })?;

    ensure_status("CGLSetCurrentContext", api.set_current_context(context.get()))?;

    query_capabilities(&api.gl_strings())
}

/// CGL adapter over a statically available API.
pub struct CglAdapter<A> {
    api: A,
}

#[cfg(target_os = "macos")]
impl CglAdapter<NativeCgl> {
    pub fn new() -> Self {
        Self { api: NativeCgl }
    }
}

#[cfg(target_os = "macos")]
impl Default for CglAdapter<NativeCgl> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> CglAdapter<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }
}

impl<A: CglApi> Adapter for CglAdapter<A> {
    fn kind(&self) -> BackendKind {
        BackendKind::Cgl
    }

    fn probe(&self, _ctx: &ProbeContext) -> ProbeOutcome {
        probe_chain(&self.api)
    }
}

#[cfg(target_os = "macos")]
pub use native::NativeCgl;

#[cfg(target_os = "macos")]
mod native {
    use super::{CglApi, CglContext, CglError, CglPixelFormat};
    use glprobe_core::GetString;
    use std::ffi::{c_int, c_uchar, c_void};
    use std::ptr::{self, NonNull};

    const K_CGL_NO_ERROR: c_int = 0;
    const K_CGL_PFA_ACCELERATED: c_int = 73;
    const K_CGL_PFA_OPENGL_PROFILE: c_int = 99;
    const K_CGL_OGLP_VERSION_3_2_CORE: c_int = 0x3200;

    #[link(name = "OpenGL", kind = "framework")]
    extern "C" {
        fn CGLChoosePixelFormat(attribs: *const c_int, pix: *mut *mut c_void, npix: *mut c_int) -> c_int;
        fn CGLDestroyPixelFormat(pix: *mut c_void) -> c_int;
        fn CGLCreateContext(pix: *mut c_void, share: *mut c_void, ctx: *mut *mut c_void) -> c_int;
        fn CGLDestroyContext(ctx: *mut c_void) -> c_int;
        fn CGLSetCurrentContext(ctx: *mut c_void) -> c_int;
        fn glGetString(name: u32) -> *const c_uchar;
    }

    fn status(code: c_int) -> Result<(), CglError> {
        if code == K_CGL_NO_ERROR {
            Ok(())
        } else {
            Err(CglError(code))
        }
    }

    /// The system OpenGL framework.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NativeCgl;

    impl CglApi for NativeCgl {
        type Strings = GetString;

        fn gl_strings(&self) -> GetString {
            // SAFETY: the chain only queries after CGLSetCurrentContext
            // succeeded; the framework stays linked for the process lifetime.
            unsafe { GetString::new(glGetString) }
        }

        fn choose_pixel_format(&self) -> Result<CglPixelFormat, CglError> {
            let attributes = [
                K_CGL_PFA_OPENGL_PROFILE,
                K_CGL_OGLP_VERSION_3_2_CORE,
                K_CGL_PFA_ACCELERATED,
                0,
            ];
            let mut pixel_format = ptr::null_mut();
            let mut count = 0;
            status(unsafe { CGLChoosePixelFormat(attributes.as_ptr(), &mut pixel_format, &mut count) })?;
            NonNull::new(pixel_format)
                .map(CglPixelFormat)
                .ok_or(CglError::BAD_PIXEL_FORMAT)
        }

        fn destroy_pixel_format(&self, pixel_format: CglPixelFormat) {
            unsafe { CGLDestroyPixelFormat(pixel_format.0.as_ptr()) };
        }

        fn create_context(&self, pixel_format: CglPixelFormat) -> Result<CglContext, CglError> {
            let mut context = ptr::null_mut();
            status(unsafe { CGLCreateContext(pixel_format.0.as_ptr(), ptr::null_mut(), &mut context) })?;
            NonNull::new(context).map(CglContext).ok_or(CglError::BAD_CONTEXT)
        }

        fn destroy_context(&self, context: CglContext) {
            unsafe { CGLDestroyContext(context.0.as_ptr()) };
        }

        fn set_current_context(&self, context: CglContext) -> Result<(), CglError> {
            status(unsafe { CGLSetCurrentContext(context.0.as_ptr()) })
        }
    }
}

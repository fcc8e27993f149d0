//! EGL backend
//!
//! Headless-capable path: a pbuffer surface on the default display. Tried
//! first in automatic mode.

use glprobe_core::capability::GlGetStringFn;
use glprobe_core::pipeline::{acquire, ensure};
use glprobe_core::{
    query_capabilities, Adapter, ApiProvider, BackendKind, GetString, GlStrings, ProbeContext,
    ProbeError, ProbeOutcome, DRAWABLE_HEIGHT, DRAWABLE_WIDTH,
};
use glprobe_loader::LibraryHandle;
use std::ffi::{c_char, c_void};
use std::ptr::{self, NonNull};
use tracing::debug;

pub const LIBRARY_STEM: &str = "libEGL";
pub const LIBRARY_MAX_VERSION: u32 = 1;

const EGL_FALSE: u32 = 0;
const EGL_TRUE: u32 = 1;
const EGL_OPENGL_API: u32 = 0x30A2;
const EGL_HEIGHT: i32 = 0x3056;
const EGL_WIDTH: i32 = 0x3057;
const EGL_NONE: i32 = 0x3038;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglDisplay(pub NonNull<c_void>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglConfig(pub NonNull<c_void>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglSurface(pub NonNull<c_void>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EglContext(pub NonNull<c_void>);

/// The slice of EGL the probe drives. `None`/`false` are the sentinels.
pub trait EglApi {
    type Strings: GlStrings;

    /// `eglGetProcAddress("glGetString")`
    fn gl_strings(&self) -> Option<Self::Strings>;
    fn get_display(&self) -> Option<EglDisplay>;
    fn initialize(&self, display: EglDisplay) -> bool;
    fn terminate(&self, display: EglDisplay);
    fn bind_api(&self) -> bool;
    /// First framebuffer configuration, `None` when the display has none.
    fn first_config(&self, display: EglDisplay) -> Option<EglConfig>;
    fn create_pbuffer_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        width: i32,
        height: i32,
    ) -> Option<EglSurface>;
    fn destroy_surface(&self, display: EglDisplay, surface: EglSurface);
    fn create_context(&self, display: EglDisplay, config: EglConfig) -> Option<EglContext>;
    fn destroy_context(&self, display: EglDisplay, context: EglContext);
    fn make_current(&self, display: EglDisplay, surface: EglSurface, context: EglContext) -> bool;
}

/// Acquire display, surface and context, query the strings, release.
pub fn probe_chain<A: EglApi>(api: &A) -> ProbeOutcome {
    let strings = api
        .gl_strings()
        .ok_or_else(|| ProbeError::native("eglGetProcAddress(glGetString)", "NULL"))?;

    let display = api
        .get_display()
        .ok_or_else(|| ProbeError::native("eglGetDisplay", "EGL_NO_DISPLAY"))?;
    let _initialized = acquire(
        "eglInitialize",
        api.initialize(display).then_some(display),
        "EGL_FALSE",
        |display| api.terminate(display),
    )?;

    ensure("eglBindAPI", api.bind_api(), "EGL_FALSE")?;

    let config = api
        .first_config(display)
        .ok_or_else(|| ProbeError::native("eglGetConfigs", "0 configs"))?;

    let surface = acquire(
        "eglCreatePbufferSurface",
        api.create_pbuffer_surface(display, config, DRAWABLE_WIDTH, DRAWABLE_HEIGHT),
        "EGL_NO_SURFACE",
        |surface| api.destroy_surface(display, surface),
    )?;

    let context = acquire(
        "eglCreateContext",
        api.create_context(display, config),
        "EGL_NO_CONTEXT",
        |context| api.destroy_context(display, context),
    )?;

    ensure(
        "eglMakeCurrent",
        api.make_current(display, surface.get(), context.get()),
        "EGL_FALSE",
    )?;

    query_capabilities(&strings)
}

/// EGL adapter; `P` opens the library.
pub struct EglAdapter<P = DynamicEgl> {
    provider: P,
}

impl EglAdapter {
    pub fn new() -> Self {
        Self { provider: DynamicEgl }
    }
}

impl Default for EglAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EglAdapter<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> Adapter for EglAdapter<P>
where
    P: ApiProvider,
    P::Api: EglApi,
{
    fn kind(&self) -> BackendKind {
        BackendKind::Egl
    }

    fn probe(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let api = self.provider.open(ctx)?;
        probe_chain(&api)
    }
}

glprobe_loader::bindings! {
    struct EglFns {
        eglGetProcAddress: unsafe extern "C" fn(*const c_char) -> Option<unsafe extern "C" fn()>,
        eglGetDisplay: unsafe extern "C" fn(*mut c_void) -> *mut c_void,
        eglInitialize: unsafe extern "C" fn(*mut c_void, *mut i32, *mut i32) -> u32,
        eglBindAPI: unsafe extern "C" fn(u32) -> u32,
        eglGetConfigs: unsafe extern "C" fn(*mut c_void, *mut *mut c_void, i32, *mut i32) -> u32,
        eglCreatePbufferSurface: unsafe extern "C" fn(*mut c_void, *mut c_void, *const i32) -> *mut c_void,
        eglCreateContext: unsafe extern "C" fn(*mut c_void, *mut c_void, *mut c_void, *const i32) -> *mut c_void,
        eglMakeCurrent: unsafe extern "C" fn(*mut c_void, *mut c_void, *mut c_void, *mut c_void) -> u32,
        eglDestroyContext: unsafe extern "C" fn(*mut c_void, *mut c_void) -> u32,
        eglDestroySurface: unsafe extern "C" fn(*mut c_void, *mut c_void) -> u32,
        eglTerminate: unsafe extern "C" fn(*mut c_void) -> u32,
    }
}

/// Loads `libEGL` (or the configured override) at probe time.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicEgl;

impl ApiProvider for DynamicEgl {
    type Api = EglLibrary;

    fn open(&self, ctx: &ProbeContext) -> Result<EglLibrary, ProbeError> {
        let library = LibraryHandle::load(ctx.library_candidates(
            BackendKind::Egl,
            LIBRARY_STEM,
            LIBRARY_MAX_VERSION,
        ))?;
        // SAFETY: field signatures follow <EGL/egl.h>.
        let fns = unsafe { EglFns::resolve(&library)? };
        Ok(EglLibrary { fns, _library: library })
    }
}

/// Bound EGL entry points. Dropping this unloads the library.
pub struct EglLibrary {
    fns: EglFns,
    _library: LibraryHandle,
}

// All calls below go through `fns`, which `_library` keeps loaded, and pass
// only handles this same library handed out earlier in the chain.
impl EglApi for EglLibrary {
    type Strings = GetString;

    fn gl_strings(&self) -> Option<GetString> {
        let function = unsafe { (self.fns.eglGetProcAddress)(c"glGetString".as_ptr()) }?;
        // SAFETY: the address returned for "glGetString" has its signature.
        Some(unsafe { GetString::new(std::mem::transmute::<unsafe extern "C" fn(), GlGetStringFn>(function)) })
    }

    fn get_display(&self) -> Option<EglDisplay> {
        NonNull::new(unsafe { (self.fns.eglGetDisplay)(ptr::null_mut()) }).map(EglDisplay)
    }

    fn initialize(&self, display: EglDisplay) -> bool {
        let (mut major, mut minor) = (0, 0);
        let status = unsafe { (self.fns.eglInitialize)(display.0.as_ptr(), &mut major, &mut minor) };
        if status != EGL_FALSE {
            debug!(major, minor, "EGL initialized");
        }
        status != EGL_FALSE
    }

    fn terminate(&self, display: EglDisplay) {
        unsafe { (self.fns.eglTerminate)(display.0.as_ptr()) };
    }

    fn bind_api(&self) -> bool {
        unsafe { (self.fns.eglBindAPI)(EGL_OPENGL_API) == EGL_TRUE }
    }

    fn first_config(&self, display: EglDisplay) -> Option<EglConfig> {
        let mut config = ptr::null_mut();
        let mut count = 0;
        unsafe { (self.fns.eglGetConfigs)(display.0.as_ptr(), &mut config, 1, &mut count) };
        if count == 0 {
            return None;
        }
        NonNull::new(config).map(EglConfig)
    }

    fn create_pbuffer_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        width: i32,
        height: i32,
    ) -> Option<EglSurface> {
        let attributes = [EGL_WIDTH, width, EGL_HEIGHT, height, EGL_NONE];
        let surface = unsafe {
            (self.fns.eglCreatePbufferSurface)(display.0.as_ptr(), config.0.as_ptr(), attributes.as_ptr())
        };
        NonNull::new(surface).map(EglSurface)
    }

    fn destroy_surface(&self, display: EglDisplay, surface: EglSurface) {
        unsafe { (self.fns.eglDestroySurface)(display.0.as_ptr(), surface.0.as_ptr()) };
    }

    fn create_context(&self, display: EglDisplay, config: EglConfig) -> Option<EglContext> {
        let attributes = [EGL_NONE];
        let context = unsafe {
            (self.fns.eglCreateContext)(
                display.0.as_ptr(),
                config.0.as_ptr(),
                ptr::null_mut(),
                attributes.as_ptr(),
            )
        };
        NonNull::new(context).map(EglContext)
    }

    fn destroy_context(&self, display: EglDisplay, context: EglContext) {
        unsafe { (self.fns.eglDestroyContext)(display.0.as_ptr(), context.0.as_ptr()) };
    }

    fn make_current(&self, display: EglDisplay, surface: EglSurface, context: EglContext) -> bool {
        let surface = surface.0.as_ptr();
        unsafe { (self.fns.eglMakeCurrent)(display.0.as_ptr(), surface, surface, context.0.as_ptr()) == EGL_TRUE }
    }
}

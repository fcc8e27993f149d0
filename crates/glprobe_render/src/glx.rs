//! GLX backend
//!
//! Renders into a 1x1 GLX pixmap on the X server named by `$DISPLAY`.

use glprobe_core::capability::GlGetStringFn;
use glprobe_core::pipeline::{acquire, ensure};
use glprobe_core::{
    query_capabilities, Adapter, ApiProvider, BackendKind, GetString, GlStrings, ProbeContext,
    ProbeError, ProbeOutcome, DRAWABLE_HEIGHT, DRAWABLE_WIDTH,
};
use glprobe_loader::LibraryHandle;
use std::ffi::{c_char, c_int, c_uchar, c_uint, c_ulong, c_void};
use std::ptr::{self, NonNull};

pub const LIBRARY_STEM: &str = "libGLX";
pub const LIBRARY_MAX_VERSION: u32 = 1;

const TRUE: c_int = 1;
const NONE: c_int = 0;
const GLX_RGBA: c_int = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XDisplay(pub NonNull<c_void>);

/// Chosen visual; `info` is owned by Xlib until `XFree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlxVisual {
    pub info: NonNull<c_void>,
    pub depth: u32,
}

/// Server-side pixmap XID, never `None` (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XPixmap(pub c_ulong);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlxPixmap(pub c_ulong);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlxContext(pub NonNull<c_void>);

/// The slice of Xlib/GLX the probe drives. `None`/`false` are the sentinels.
pub trait GlxApi {
    type Strings: GlStrings;

    /// `glXGetProcAddress("glGetString")`
    fn gl_strings(&self) -> Option<Self::Strings>;
    fn open_display(&self) -> Option<XDisplay>;
    fn close_display(&self, display: XDisplay);
    /// An RGBA visual on the default screen.
    fn choose_visual(&self, display: XDisplay) -> Option<GlxVisual>;
    fn free_visual(&self, visual: GlxVisual);
    /// Pixmap on the default root window.
    fn create_pixmap(&self, display: XDisplay, width: u32, height: u32, depth: u32) -> Option<XPixmap>;
    fn free_pixmap(&self, display: XDisplay, pixmap: XPixmap);
    fn create_glx_pixmap(&self, display: XDisplay, visual: GlxVisual, pixmap: XPixmap) -> Option<GlxPixmap>;
    fn destroy_glx_pixmap(&self, display: XDisplay, pixmap: GlxPixmap);
    fn create_context(&self, display: XDisplay, visual: GlxVisual) -> Option<GlxContext>;
    fn destroy_context(&self, display: XDisplay, context: GlxContext);
    fn make_current(&self, display: XDisplay, drawable: GlxPixmap, context: GlxContext) -> bool;
}

/// Acquire display, visual, pixmaps and context, query the strings, release.
pub fn probe_chain<A: GlxApi>(api: &A) -> ProbeOutcome {
    let strings = api
        .gl_strings()
        .ok_or_else(|| ProbeError::native("glXGetProcAddress(glGetString)", "NULL"))?;

    let connection = acquire("XOpenDisplay", api.open_display(), "NULL", |display| {
        api.close_display(display)
    })?;
    let display = connection.get();

    let visual = acquire("glXChooseVisual", api.choose_visual(display), "NULL", |visual| {
        api.free_visual(visual)
    })?;

    let pixmap = acquire(
        "XCreatePixmap",
        api.create_pixmap(display, DRAWABLE_WIDTH as u32, DRAWABLE_HEIGHT as u32, visual.get().depth),
        "None",
        |pixmap| api.free_pixmap(display, pixmap),
    )?;

    let glx_pixmap = acquire(
        "glXCreateGLXPixmap",
        api.create_glx_pixmap(display, visual.get(), pixmap.get()),
        "None",
        |glx_pixmap| api.destroy_glx_pixmap(display, glx_pixmap),
    )?;

    let context = acquire(
        "glXCreateContext",
        api.create_context(display, visual.get()),
        "NULL",
        |context| api.destroy_context(display, context),
    )?;

    ensure(
        "glXMakeCurrent",
        api.make_current(display, glx_pixmap.get(), context.get()),
        "False",
    )?;

    query_capabilities(&strings)
}

/// GLX adapter; `P` opens the library.
pub struct GlxAdapter<P = DynamicGlx> {
    provider: P,
}

impl GlxAdapter {
    pub fn new() -> Self {
        Self { provider: DynamicGlx }
    }
}

impl Default for GlxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> GlxAdapter<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> Adapter for GlxAdapter<P>
where
    P: ApiProvider,
    P::Api: GlxApi,
{
    fn kind(&self) -> BackendKind {
        BackendKind::Glx
    }

    fn probe(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let api = self.provider.open(ctx)?;
        probe_chain(&api)
    }
}

#[allow(dead_code)]
#[repr(C)]
struct XVisualInfo {
    visual: *mut c_void,
    visualid: c_ulong,
    screen: c_int,
    depth: c_int,
    class: c_int,
    red_mask: c_ulong,
    green_mask: c_ulong,
    blue_mask: c_ulong,
    colormap_size: c_int,
    bits_per_rgb: c_int,
}

// Xlib entry points resolve through libGLX's dependency on libX11.
glprobe_loader::bindings! {
    struct GlxFns {
        glXGetProcAddress: unsafe extern "C" fn(*const c_uchar) -> Option<unsafe extern "C" fn()>,
        XOpenDisplay: unsafe extern "C" fn(*const c_char) -> *mut c_void,
        XCloseDisplay: unsafe extern "C" fn(*mut c_void) -> c_int,
        XDefaultScreen: unsafe extern "C" fn(*mut c_void) -> c_int,
        XDefaultRootWindow: unsafe extern "C" fn(*mut c_void) -> c_ulong,
        XFree: unsafe extern "C" fn(*mut c_void) -> c_int,
        glXChooseVisual: unsafe extern "C" fn(*mut c_void, c_int, *mut c_int) -> *mut XVisualInfo,
        XCreatePixmap: unsafe extern "C" fn(*mut c_void, c_ulong, c_uint, c_uint, c_uint) -> c_ulong,
        XFreePixmap: unsafe extern "C" fn(*mut c_void, c_ulong) -> c_int,
        glXCreateGLXPixmap: unsafe extern "C" fn(*mut c_void, *mut XVisualInfo, c_ulong) -> c_ulong,
        glXDestroyGLXPixmap: unsafe extern "C" fn(*mut c_void, c_ulong),
        glXCreateContext: unsafe extern "C" fn(*mut c_void, *mut XVisualInfo, *mut c_void, c_int) -> *mut c_void,
        glXDestroyContext: unsafe extern "C" fn(*mut c_void, *mut c_void),
        glXMakeCurrent: unsafe extern "C" fn(*mut c_void, c_ulong, *mut c_void) -> c_int,
    }
}

/// Loads `libGLX` (or the configured override) at probe time.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicGlx;

impl ApiProvider for DynamicGlx {
    type Api = GlxLibrary;

    fn open(&self, ctx: &ProbeContext) -> Result<GlxLibrary, ProbeError> {
        let library = LibraryHandle::load(ctx.library_candidates(
            BackendKind::Glx,
            LIBRARY_STEM,
            LIBRARY_MAX_VERSION,
        ))?;
        // SAFETY: field signatures follow <X11/Xlib.h> and <GL/glx.h>.
        let fns = unsafe { GlxFns::resolve(&library)? };
        Ok(GlxLibrary { fns, _library: library })
    }
}

/// Bound Xlib/GLX entry points. Dropping this unloads the library.
pub struct GlxLibrary {
    fns: GlxFns,
    _library: LibraryHandle,
}

impl GlxApi for GlxLibrary {
    type Strings = GetString;

    fn gl_strings(&self) -> Option<GetString> {
        let function = unsafe { (self.fns.glXGetProcAddress)(c"glGetString".as_ptr().cast()) }?;
        // SAFETY: the address returned for "glGetString" has its signature.
        Some(unsafe { GetString::new(std::mem::transmute::<unsafe extern "C" fn(), GlGetStringFn>(function)) })
    }

    fn open_display(&self) -> Option<XDisplay> {
        NonNull::new(unsafe { (self.fns.XOpenDisplay)(ptr::null()) }).map(XDisplay)
    }

    fn close_display(&self, display: XDisplay) {
        unsafe { (self.fns.XCloseDisplay)(display.0.as_ptr()) };
    }

    fn choose_visual(&self, display: XDisplay) -> Option<GlxVisual> {
        let mut attributes = [GLX_RGBA, NONE];
        let info = unsafe {
            let screen = (self.fns.XDefaultScreen)(display.0.as_ptr());
            (self.fns.glXChooseVisual)(display.0.as_ptr(), screen, attributes.as_mut_ptr())
        };
        let info = NonNull::new(info)?;
        // SAFETY: non-null results of glXChooseVisual point at an XVisualInfo.
        let depth = unsafe { info.as_ref().depth };
        Some(GlxVisual {
            info: info.cast(),
            depth: depth.max(0) as u32,
        })
    }

    fn free_visual(&self, visual: GlxVisual) {
        unsafe { (self.fns.XFree)(visual.info.as_ptr()) };
    }

    fn create_pixmap(&self, display: XDisplay, width: u32, height: u32, depth: u32) -> Option<XPixmap> {
        let pixmap = unsafe {
            let root = (self.fns.XDefaultRootWindow)(display.0.as_ptr());
            (self.fns.XCreatePixmap)(display.0.as_ptr(), root, width, height, depth)
        };
        (pixmap != 0).then_some(XPixmap(pixmap))
    }

    fn free_pixmap(&self, display: XDisplay, pixmap: XPixmap) {
        unsafe { (self.fns.XFreePixmap)(display.0.as_ptr(), pixmap.0) };
    }

    fn create_glx_pixmap(&self, display: XDisplay, visual: GlxVisual, pixmap: XPixmap) -> Option<GlxPixmap> {
        let glx_pixmap = unsafe {
            (self.fns.glXCreateGLXPixmap)(display.0.as_ptr(), visual.info.cast::<XVisualInfo>().as_ptr(), pixmap.0)
        };
        (glx_pixmap != 0).then_some(GlxPixmap(glx_pixmap))
    }

    fn destroy_glx_pixmap(&self, display: XDisplay, pixmap: GlxPixmap) {
        unsafe { (self.fns.glXDestroyGLXPixmap)(display.0.as_ptr(), pixmap.0) };
    }

    fn create_context(&self, display: XDisplay, visual: GlxVisual) -> Option<GlxContext> {
        let context = unsafe {
            (self.fns.glXCreateContext)(display.0.as_ptr(), visual.info.cast::<XVisualInfo>().as_ptr(), ptr::null_mut(), TRUE)
        };
        NonNull::new(context).map(GlxContext)
    }

    fn destroy_context(&self, display: XDisplay, context: GlxContext) {
        unsafe { (self.fns.glXDestroyContext)(display.0.as_ptr(), context.0.as_ptr()) };
    }

    fn make_current(&self, display: XDisplay, drawable: GlxPixmap, context: GlxContext) -> bool {
        unsafe { (self.fns.glXMakeCurrent)(display.0.as_ptr(), drawable.0, context.0.as_ptr()) == TRUE }
    }
}

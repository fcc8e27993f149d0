//! OSMesa backend
//!
//! Mesa's off-screen software rasterizer. It renders into caller memory,
//! so there is no display, configuration or surface to acquire. Only
//! reachable by explicit request.

use glprobe_core::capability::GlGetStringFn;
use glprobe_core::pipeline::{acquire, ensure};
use glprobe_core::{
    query_capabilities, Adapter, ApiProvider, BackendKind, GetString, GlStrings, ProbeContext,
    ProbeError, ProbeOutcome, DRAWABLE_HEIGHT, DRAWABLE_WIDTH,
};
use glprobe_loader::LibraryHandle;
use std::ffi::{c_char, c_int, c_uchar, c_void};
use std::ptr::{self, NonNull};

pub const LIBRARY_STEM: &str = "libOSMesa";
pub const LIBRARY_MAX_VERSION: u32 = 8;

const OSMESA_RGBA: u32 = 0x1908;
const GL_UNSIGNED_BYTE: u32 = 0x1401;
const GL_TRUE: c_uchar = 1;

/// Bytes in the RGBA colour buffer backing the 1x1 drawable.
const BUFFER_LEN: usize = (DRAWABLE_WIDTH * DRAWABLE_HEIGHT) as usize * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsMesaContext(pub NonNull<c_void>);

/// The slice of OSMesa the probe drives. `None`/`false` are the sentinels.
pub trait OsMesaApi {
    type Strings: GlStrings;

    /// `OSMesaGetProcAddress("glGetString")`
    fn gl_strings(&self) -> Option<Self::Strings>;
    fn create_context(&self) -> Option<OsMesaContext>;
    fn destroy_context(&self, context: OsMesaContext);
    /// Bind `context` to `buffer`, an RGBA image of `width` x `height`.
    fn make_current(&self, context: OsMesaContext, buffer: &mut [u8], width: i32, height: i32) -> bool;
}

/// Create a context over a local colour buffer, query the strings, release.
pub fn probe_chain<A: OsMesaApi>(api: &A) -> ProbeOutcome {
    let strings = api
        .gl_strings()
        .ok_or_else(|| ProbeError::native("OSMesaGetProcAddress(glGetString)", "NULL"))?;

    // Outlives the context that renders into it.
    let mut buffer = [0u8; BUFFER_LEN];

    let context = acquire("OSMesaCreateContext", api.create_context(), "NULL", |context| {
        api.destroy_context(context)
    })?;

    ensure(
        "OSMesaMakeCurrent",
        api.make_current(context.get(), &mut buffer, DRAWABLE_WIDTH, DRAWABLE_HEIGHT),
        "GL_FALSE",
    )?;

    query_capabilities(&strings)
}

/// OSMesa adapter; `P` opens the library.
pub struct OsMesaAdapter<P = DynamicOsMesa> {
    provider: P,
}

impl OsMesaAdapter {
    pub fn new() -> Self {
        Self { provider: DynamicOsMesa }
    }
}

impl Default for OsMesaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> OsMesaAdapter<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> Adapter for OsMesaAdapter<P>
where
    P: ApiProvider,
    P::Api: OsMesaApi,
{
    fn kind(&self) -> BackendKind {
        BackendKind::OsMesa
    }

    fn probe(&self, ctx: &ProbeContext) -> ProbeOutcome {
        let api = self.provider.open(ctx)?;
        probe_chain(&api)
    }
}

glprobe_loader::bindings! {
    struct OsMesaFns {
        OSMesaGetProcAddress: unsafe extern "C" fn(*const c_char) -> Option<unsafe extern "C" fn()>,
        OSMesaCreateContext: unsafe extern "C" fn(u32, *mut c_void) -> *mut c_void,
        OSMesaMakeCurrent: unsafe extern "C" fn(*mut c_void, *mut c_void, u32, c_int, c_int) -> c_uchar,
        OSMesaDestroyContext: unsafe extern "C" fn(*mut c_void),
    }
}

/// Loads `libOSMesa` (or the configured override) at probe time.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicOsMesa;

impl ApiProvider for DynamicOsMesa {
    type Api = OsMesaLibrary;

    fn open(&self, ctx: &ProbeContext) -> Result<OsMesaLibrary, ProbeError> {
        let library = LibraryHandle::load(ctx.library_candidates(
            BackendKind::OsMesa,
            LIBRARY_STEM,
            LIBRARY_MAX_VERSION,
        ))?;
        // SAFETY: field signatures follow <GL/osmesa.h>.
        let fns = unsafe { OsMesaFns::resolve(&library)? };
        Ok(OsMesaLibrary { fns, _library: library })
    }
}

/// Bound OSMesa entry points. Dropping this unloads the library.
pub struct OsMesaLibrary {
    fns: OsMesaFns,
    _library: LibraryHandle,
}

impl OsMesaApi for OsMesaLibrary {
    type Strings = GetString;

    fn gl_strings(&self) -> Option<GetString> {
        let function = unsafe { (self.fns.OSMesaGetProcAddress)(c"glGetString".as_ptr()) }?;
        // SAFETY: the address returned for "glGetString" has its signature.
        Some(unsafe { GetString::new(std::mem::transmute::<unsafe extern "C" fn(), GlGetStringFn>(function)) })
    }

    fn create_context(&self) -> Option<OsMesaContext> {
        NonNull::new(unsafe { (self.fns.OSMesaCreateContext)(OSMESA_RGBA, ptr::null_mut()) }).map(OsMesaContext)
    }

    fn destroy_context(&self, context: OsMesaContext) {
        unsafe { (self.fns.OSMesaDestroyContext)(context.0.as_ptr()) };
    }

    fn make_current(&self, context: OsMesaContext, buffer: &mut [u8], width: i32, height: i32) -> bool {
        debug_assert!(buffer.len() >= (width * height) as usize * 4);
        unsafe {
            (self.fns.OSMesaMakeCurrent)(
                context.0.as_ptr(),
                buffer.as_mut_ptr().cast(),
                GL_UNSIGNED_BYTE,
                width,
                height,
            ) == GL_TRUE
        }
    }
}

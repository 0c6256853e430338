//! libvips lifecycle.
//!
//! libvips keeps process-wide state that must be set up before any image is
//! touched and torn down at most once. [`Vips`] is the proof that setup
//! happened: every operation is a method on it, and the only way to get one
//! is [`Vips::init`] or [`Vips::get`].

use core::ffi::c_int;
use core::sync::atomic::{AtomicBool, Ordering};
use std::ffi::CString;
use std::sync::OnceLock;

use tracing::{debug, info, info_span, warn};

use crate::config::RuntimeConfig;
use crate::error::{take_vips_error, Error, Result};
use crate::ffi;
use crate::image;
use crate::types::RuntimeStats;

static RUNTIME: OnceLock<Result<Vips>> = OnceLock::new();
static SHUT_DOWN: AtomicBool = AtomicBool::new(false);

/// Handle to the initialized libvips runtime.
///
/// # Example
///
/// ```rust,no_run
/// use vipsx::{JpegSaveParams, RuntimeConfig, Vips};
///
/// let vips = Vips::init(RuntimeConfig::new("importer"))?;
/// let result = vips.convert_jpeg("in.png", "out.jpg", &JpegSaveParams::new(), Some(0.5))?;
/// println!("wrote {}x{}", result.width, result.height);
/// vips.teardown();
/// # Ok::<(), vipsx::Error>(())
/// ```
#[derive(Debug)]
pub struct Vips {
    config: RuntimeConfig,
}

impl Vips {
    /// Initialize libvips once for this process.
    ///
    /// The first call runs `vips_init` and applies `config`. Later calls
    /// return the same handle and ignore their config. An invalid `config`
    /// is rejected without touching libvips, so a later call can still
    /// succeed. A failed `vips_init` is remembered and returned again.
    pub fn init(config: RuntimeConfig) -> Result<&'static Vips> {
        if SHUT_DOWN.load(Ordering::SeqCst) {
            return Err(Error::ShutDown);
        }
        if RUNTIME.get().is_none() {
            config.validate()?;
        }
        let mut requested = Some(config);
        let runtime = RUNTIME.get_or_init(|| match requested.take() {
            Some(config) => Vips::start(config),
            None => Err(Error::Internal("runtime config consumed twice".into())),
        });
        if let (Some(config), Ok(vips)) = (requested, runtime) {
            if config != vips.config {
                debug!(
                    program_name = %config.program_name,
                    "libvips already initialized, ignoring new runtime config"
                );
            }
        }
        runtime.as_ref().map_err(Clone::clone)
    }

    /// The runtime set up by an earlier [`Vips::init`].
    pub fn get() -> Result<&'static Vips> {
        match RUNTIME.get() {
            None => Err(Error::NotInitialized),
            Some(runtime) => {
                let vips = runtime.as_ref().map_err(Clone::clone)?;
                vips.ensure_running()?;
                Ok(vips)
            }
        }
    }

    fn start(config: RuntimeConfig) -> Result<Vips> {
        let span = info_span!("libvips initialization", program_name = %config.program_name);
        let _enter = span.enter();

        let name = CString::new(config.program_name.as_str())
            .map_err(|_| Error::InvalidConfig("program name contains a NUL byte".into()))?;
        let ret = unsafe { ffi::vips_init(name.as_ptr()) };
        if ret != 0 {
            let message = take_vips_error();
            warn!(%message, "could not initialize libvips");
            return Err(Error::InitFailed(message));
        }

        unsafe {
            if let Some(threads) = config.concurrency {
                ffi::vips_concurrency_set(threads as c_int);
            }
            if let Some(max) = config.cache_max_operations {
                ffi::vips_cache_set_max(max as c_int);
            }
            if let Some(bytes) = config.cache_max_memory {
                ffi::vips_cache_set_max_mem(bytes);
            }
            if config.leak_report {
                ffi::vips_leak_set(1);
            }
        }

        let (major, minor, patch) = crate::version();
        let version = format!("{}.{}.{}", major, minor, patch);
        info!(%version, "libvips initialized");
        Ok(Vips { config })
    }

    /// Shut libvips down. Only the first call has an effect.
    ///
    /// Callers must make sure no operation is running on another thread.
    /// Every operation started afterwards fails with [`Error::ShutDown`].
    pub fn teardown(&self) {
        if SHUT_DOWN.swap(true, Ordering::SeqCst) {
            return;
        }
        let span = info_span!("libvips teardown");
        let _enter = span.enter();
        let live = image::live_images();
        if live != 0 {
            warn!(live, "shutting down libvips with live image handles");
        }
        unsafe { ffi::vips_shutdown() };
    }

    /// Whether [`Vips::teardown`] has run.
    pub fn is_shut_down(&self) -> bool {
        SHUT_DOWN.load(Ordering::SeqCst)
    }

    /// Configuration the runtime was started with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current resource counters.
    pub fn stats(&self) -> RuntimeStats {
        let (tracked_allocs, tracked_mem, open_files) = if self.is_shut_down() {
            (0, 0, 0)
        } else {
            unsafe {
                (
                    ffi::vips_tracked_get_allocs().max(0) as u64,
                    ffi::vips_tracked_get_mem(),
                    ffi::vips_tracked_get_files().max(0) as u64,
                )
            }
        };
        RuntimeStats {
            live_images: image::live_images(),
            tracked_allocs,
            tracked_mem,
            open_files,
        }
    }

    pub(crate) fn ensure_running(&self) -> Result<()> {
        if self.is_shut_down() {
            return Err(Error::ShutDown);
        }
        Ok(())
    }
}

//! C-callable entry points.
//!
//! Every function returns a status code from [`Status`] (0 on success) and
//! never unwinds into the caller. The diagnostic of the last failure on the
//! calling thread is available from [`vipsx_last_error`].

use core::cell::RefCell;
use core::ffi::{c_char, c_int};
use std::ffi::{CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use tracing::error;

use crate::config::{HeifSaveParams, JpegSaveParams, RuntimeConfig};
use crate::error::{Error, Result, Status};
use crate::runtime::Vips;
use crate::types::{ConvertResult, OutDimension, ThumbnailResult};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// JPEG encoder parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VipsxJpegSaveParams {
    /// Quality, 1..=100.
    pub quality: c_int,
}

/// HEIF encoder parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VipsxHeifSaveParams {
    /// Quality, 1..=100.
    pub quality: c_int,
    /// Non-zero for lossless.
    pub lossless: c_int,
    /// 8, 10 or 12.
    pub bit_depth: c_int,
    /// 1 = HEVC, 2 = AVC, 3 = JPEG, 4 = AV1.
    pub compression: c_int,
}

/// Optional uniform resize.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VipsxScale {
    /// Whether to resize at all.
    pub do_scale: bool,
    /// Multiplicative factor, must be finite and positive when `do_scale`.
    pub scale: f64,
}

impl VipsxScale {
    fn factor(self) -> Option<f64> {
        self.do_scale.then_some(self.scale)
    }
}

/// Conversion outcome. `err` is a [`Status`] code; dimensions are zero on
/// failure.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VipsxConvertResult {
    /// 0 on success.
    pub err: c_int,
    /// Encoded width.
    pub width: c_int,
    /// Encoded height.
    pub height: c_int,
}

/// Thumbnail request.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VipsxThumbnailParams {
    /// Source image path.
    pub in_path: *const c_char,
    /// Array of `num_out_paths` output paths.
    pub out_paths: *const *const c_char,
    /// Length of `out_paths`.
    pub num_out_paths: u64,
    /// Fit into `width` keeping the aspect ratio; `height` is ignored.
    pub keep_aspect: bool,
    /// Target width.
    pub width: c_int,
    /// Target height for attention cropping.
    pub height: c_int,
}

/// Thumbnail dimensions.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VipsxThumbnailResult {
    /// Actual width.
    pub actual_width: c_int,
    /// Actual height.
    pub actual_height: c_int,
}

/// Orientation-corrected image dimensions.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VipsxImageInfo {
    /// Display width.
    pub width: c_int,
    /// Display height.
    pub height: c_int,
}

/// Initialize libvips. `name` identifies the host program and may be null.
///
/// # Safety
///
/// `name` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn vipsx_init(name: *const c_char) -> c_int {
    status_of(guarded(|| {
        let config = if name.is_null() {
            RuntimeConfig::default()
        } else {
            let name = unsafe { CStr::from_ptr(name) };
            RuntimeConfig::new(name.to_string_lossy())
        };
        Vips::init(config).map(|_| ())
    }))
}

/// Shut libvips down. Safe to call more than once.
#[no_mangle]
pub extern "C" fn vipsx_teardown() {
    let _ = guarded(|| {
        if let Ok(vips) = Vips::get() {
            vips.teardown();
        }
        Ok(())
    });
}

/// Convert to JPEG.
///
/// # Safety
///
/// `in_path` and `out_path` must be null or NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn vipsx_convert_jpeg(
    in_path: *const c_char,
    out_path: *const c_char,
    params: VipsxJpegSaveParams,
    scale: VipsxScale,
) -> VipsxConvertResult {
    convert_result(guarded(|| {
        let in_path = unsafe { path_arg("in_path", in_path) }?;
        let out_path = unsafe { path_arg("out_path", out_path) }?;
        let params = JpegSaveParams::from_raw(params.quality)?;
        Vips::get()?.convert_jpeg(in_path, out_path, &params, scale.factor())
    }))
}

/// Convert to HEIF.
///
/// # Safety
///
/// `in_path` and `out_path` must be null or NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn vipsx_convert_heif(
    in_path: *const c_char,
    out_path: *const c_char,
    params: VipsxHeifSaveParams,
    scale: VipsxScale,
) -> VipsxConvertResult {
    convert_result(guarded(|| {
        let in_path = unsafe { path_arg("in_path", in_path) }?;
        let out_path = unsafe { path_arg("out_path", out_path) }?;
        let params = HeifSaveParams::from_raw(
            params.quality,
            params.lossless,
            params.bit_depth,
            params.compression,
        )?;
        Vips::get()?.convert_heif(in_path, out_path, &params, scale.factor())
    }))
}

/// Generate one thumbnail and write it to every output path.
///
/// `result` is filled as soon as the thumbnail is generated, so it holds
/// the dimensions even if a later write fails.
///
/// # Safety
///
/// `result` must be null or valid for writes. The strings referenced by
/// `params` must be NUL-terminated and `out_paths` must hold
/// `num_out_paths` entries.
#[no_mangle]
pub unsafe extern "C" fn vipsx_thumbnail(
    params: VipsxThumbnailParams,
    result: *mut VipsxThumbnailResult,
) -> c_int {
    status_of(guarded(|| {
        if result.is_null() {
            return Err(Error::InvalidInput("result pointer is null".into()));
        }
        let in_path = unsafe { path_arg("in_path", params.in_path) }?;
        let out_paths = unsafe { path_list(params.out_paths, params.num_out_paths) }?;
        let vips = Vips::get()?;
        if out_paths.is_empty() {
            unsafe { result.write(VipsxThumbnailResult::default()) };
            return Ok(());
        }
        let out_dimension = out_dimension(&params)?;
        vips.thumbnail_with(&in_path, out_dimension, &out_paths, |generated| {
            unsafe { result.write(to_c_thumbnail(generated)) };
        })?;
        Ok(())
    }))
}

/// Read orientation-corrected dimensions.
///
/// # Safety
///
/// `path` must be null or a NUL-terminated string and `out` must be null or
/// valid for writes.
#[no_mangle]
pub unsafe extern "C" fn vipsx_read_image_info(
    path: *const c_char,
    out: *mut VipsxImageInfo,
) -> c_int {
    status_of(guarded(|| {
        if out.is_null() {
            return Err(Error::InvalidInput("output pointer is null".into()));
        }
        let path = unsafe { path_arg("path", path) }?;
        let info = Vips::get()?.read_image_info(path)?;
        unsafe {
            out.write(VipsxImageInfo {
                width: clamp_c_int(info.width),
                height: clamp_c_int(info.height),
            })
        };
        Ok(())
    }))
}

/// Diagnostic of the last failed call on this thread, or null.
///
/// The pointer stays valid until the next `vipsx_*` call on the same thread.
#[no_mangle]
pub extern "C" fn vipsx_last_error() -> *const c_char {
    LAST_ERROR.with(|last| {
        last.borrow()
            .as_ref()
            .map_or(core::ptr::null(), |msg| msg.as_ptr())
    })
}

/// Run `f`, turning panics into [`Error::Internal`] and recording failures.
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic".into());
        Err(Error::Internal(msg))
    });
    let message = match &outcome {
        Ok(_) => None,
        Err(err) => {
            error!(status = %err.status(), %err, "vipsx call failed");
            CString::new(err.to_string().replace('\0', " ")).ok()
        }
    };
    LAST_ERROR.with(|last| *last.borrow_mut() = message);
    outcome
}

fn status_of(outcome: Result<()>) -> c_int {
    match outcome {
        Ok(()) => Status::Ok as c_int,
        Err(err) => err.status() as c_int,
    }
}

fn convert_result(outcome: Result<ConvertResult>) -> VipsxConvertResult {
    match outcome {
        Ok(result) => VipsxConvertResult {
            err: Status::Ok as c_int,
            width: clamp_c_int(result.width),
            height: clamp_c_int(result.height),
        },
        Err(err) => VipsxConvertResult {
            err: err.status() as c_int,
            ..VipsxConvertResult::default()
        },
    }
}

fn to_c_thumbnail(result: &ThumbnailResult) -> VipsxThumbnailResult {
    VipsxThumbnailResult {
        actual_width: clamp_c_int(result.actual_width),
        actual_height: clamp_c_int(result.actual_height),
    }
}

fn out_dimension(params: &VipsxThumbnailParams) -> Result<OutDimension> {
    let width = positive("width", params.width)?;
    if params.keep_aspect {
        Ok(OutDimension::KeepAspect { width })
    } else {
        Ok(OutDimension::Crop {
            width,
            height: positive("height", params.height)?,
        })
    }
}

fn positive(name: &str, value: c_int) -> Result<u32> {
    match u32::try_from(value) {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::InvalidInput(format!(
            "thumbnail {} must be positive, got {}",
            name, value
        ))),
    }
}

fn clamp_c_int(value: u32) -> c_int {
    c_int::try_from(value).unwrap_or(c_int::MAX)
}

/// # Safety
///
/// `ptr` must be null or a NUL-terminated string.
unsafe fn path_arg(name: &str, ptr: *const c_char) -> Result<PathBuf> {
    if ptr.is_null() {
        return Err(Error::InvalidInput(format!("{} is null", name)));
    }
    let raw = unsafe { CStr::from_ptr(ptr) };

    #[cfg(unix)]
    let path = {
        use std::os::unix::ffi::OsStrExt;
        PathBuf::from(std::ffi::OsStr::from_bytes(raw.to_bytes()))
    };
    #[cfg(not(unix))]
    let path = PathBuf::from(
        raw.to_str()
            .map_err(|_| Error::InvalidInput(format!("{} is not UTF-8", name)))?,
    );

    Ok(path)
}

/// # Safety
///
/// `ptrs` must be null or hold `len` pointers that are each null or
/// NUL-terminated strings.
unsafe fn path_list(ptrs: *const *const c_char, len: u64) -> Result<Vec<PathBuf>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    let len = usize::try_from(len)
        .map_err(|_| Error::InvalidInput(format!("{} output paths do not fit in memory", len)))?;
    if ptrs.is_null() {
        return Err(Error::InvalidInput("out_paths is null".into()));
    }
    let raw = unsafe { core::slice::from_raw_parts(ptrs, len) };
    raw.iter()
        .enumerate()
        .map(|(i, &ptr)| unsafe { path_arg(&format!("out_paths[{}]", i), ptr) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ptr;

    fn params(out_paths: &[*const c_char]) -> VipsxThumbnailParams {
        VipsxThumbnailParams {
            in_path: c"/nonexistent/input.jpg".as_ptr(),
            out_paths: out_paths.as_ptr(),
            num_out_paths: out_paths.len() as u64,
            keep_aspect: true,
            width: 100,
            height: 0,
        }
    }

    #[test]
    fn test_thumbnail_null_result_is_rejected() {
        let dir = std::env::temp_dir().join("vipsx-capi-null-result");
        let out = CString::new(dir.join("thumb.jpg").to_str().unwrap()).unwrap();
        let outs = [out.as_ptr()];

        let status = unsafe { vipsx_thumbnail(params(&outs), ptr::null_mut()) };

        assert_eq!(status, Status::InvalidInput as c_int);
        assert_eq!(status, -1);
        assert!(!dir.join("thumb.jpg").exists());
        let msg = unsafe { CStr::from_ptr(vipsx_last_error()) };
        assert!(msg.to_str().unwrap().contains("result pointer is null"));
    }

    #[test]
    fn test_read_image_info_null_arguments() {
        let mut info = VipsxImageInfo::default();
        let status = unsafe { vipsx_read_image_info(ptr::null(), &mut info) };
        assert_eq!(status, Status::InvalidInput as c_int);

        let status = unsafe { vipsx_read_image_info(c"a.jpg".as_ptr(), ptr::null_mut()) };
        assert_eq!(status, Status::InvalidInput as c_int);
    }

    #[test]
    fn test_thumbnail_null_out_paths_with_count() {
        let mut result = VipsxThumbnailResult::default();
        let mut p = params(&[]);
        p.out_paths = ptr::null();
        p.num_out_paths = 2;
        let status = unsafe { vipsx_thumbnail(p, &mut result) };
        assert_eq!(status, Status::InvalidInput as c_int);
    }

    #[test]
    fn test_path_list_empty_ignores_pointer() {
        let paths = unsafe { path_list(ptr::null(), 0) }.unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_path_list_reads_count() {
        let outs = [c"a.jpg".as_ptr(), c"b.webp".as_ptr()];
        let paths = unsafe { path_list(outs.as_ptr(), 2) }.unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.jpg"), PathBuf::from("b.webp")]);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_path_list_count_beyond_address_space() {
        let outs = [c"a.jpg".as_ptr()];
        let err = unsafe { path_list(outs.as_ptr(), u64::from(u32::MAX) + 1) }.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "got {:?}", err);
    }

    #[test]
    fn test_convert_rejects_unknown_compression() {
        let result = unsafe {
            vipsx_convert_heif(
                c"in.png".as_ptr(),
                c"out.avif".as_ptr(),
                VipsxHeifSaveParams {
                    quality: 50,
                    lossless: 0,
                    bit_depth: 8,
                    compression: 7,
                },
                VipsxScale {
                    do_scale: false,
                    scale: 0.0,
                },
            )
        };
        assert_eq!(result.err, Status::InvalidConfig as c_int);
        assert_eq!((result.width, result.height), (0, 0));
    }

    #[test]
    fn test_convert_null_paths() {
        let result = unsafe {
            vipsx_convert_jpeg(
                ptr::null(),
                c"out.jpg".as_ptr(),
                VipsxJpegSaveParams { quality: 80 },
                VipsxScale {
                    do_scale: false,
                    scale: 0.0,
                },
            )
        };
        assert_eq!(result.err, Status::InvalidInput as c_int);
    }

    #[test]
    fn test_out_dimension() {
        let mut p = params(&[]);
        assert_eq!(
            out_dimension(&p).unwrap(),
            OutDimension::KeepAspect { width: 100 }
        );
        p.keep_aspect = false;
        assert!(out_dimension(&p).is_err(), "crop needs a height");
        p.height = 50;
        assert_eq!(
            out_dimension(&p).unwrap(),
            OutDimension::Crop {
                width: 100,
                height: 50
            }
        );
        p.width = -4;
        assert!(out_dimension(&p).is_err());
    }

    #[test]
    fn test_scale_factor() {
        let off = VipsxScale {
            do_scale: false,
            scale: 0.5,
        };
        let on = VipsxScale {
            do_scale: true,
            scale: 0.5,
        };
        assert_eq!(off.factor(), None);
        assert_eq!(on.factor(), Some(0.5));
    }

    #[test]
    fn test_last_error_cleared_on_success() {
        let _ = guarded::<()>(|| Err(Error::NotInitialized));
        assert!(!vipsx_last_error().is_null());
        let _ = guarded(|| Ok(()));
        assert!(vipsx_last_error().is_null());
    }

    #[test]
    fn test_guarded_catches_panics() {
        let outcome = guarded::<()>(|| panic!("boom"));
        assert_eq!(outcome, Err(Error::Internal("boom".into())));
    }
}

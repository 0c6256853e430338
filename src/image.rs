//! Owned libvips image handles.

use core::ffi::{c_char, c_int, c_void};
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::ffi::CString;
use std::path::Path;

use imgref::ImgRef;
use rgb::RGB8;

use crate::config::{HeifSaveParams, JpegSaveParams, WebpSaveParams};
use crate::error::{take_vips_error, Error, Result};
use crate::ffi;
use crate::types::{OutDimension, Size};

/// Handles created by [`VipsImage`] and not yet released.
static LIVE_IMAGES: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn live_images() -> usize {
    LIVE_IMAGES.load(Ordering::SeqCst)
}

/// An owned reference to a libvips image, released on drop.
pub(crate) struct VipsImage {
    ptr: NonNull<ffi::VipsImage>,
}

// GObject reference counting is thread safe and this type never hands out
// shared mutable access to the image.
unsafe impl Send for VipsImage {}

impl VipsImage {
    /// Take ownership of a reference returned by libvips.
    fn from_raw(ptr: *mut ffi::VipsImage) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        LIVE_IMAGES.fetch_add(1, Ordering::SeqCst);
        Some(Self { ptr })
    }

    fn as_ptr(&self) -> *mut ffi::VipsImage {
        self.ptr.as_ptr()
    }

    /// Open an image. Only the header is read until pixels are needed.
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let c_path = path_to_cstring(path)?;
        let raw = unsafe { ffi::vips_image_new_from_file(c_path.as_ptr(), ptr::null::<c_char>()) };
        Self::from_raw(raw).ok_or_else(|| Error::LoadFailed {
            path: path.display().to_string(),
            message: take_vips_error(),
        })
    }

    /// Copy 8-bit RGB pixels into a new in-memory image.
    pub(crate) fn from_pixels(img: ImgRef<'_, RGB8>) -> Result<Self> {
        let width = to_c_int("width", img.width())?;
        let height = to_c_int("height", img.height())?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(
                "width and height must be non-zero".into(),
            ));
        }
        let bytes: Vec<u8> = img.pixels().flat_map(|px| [px.r, px.g, px.b]).collect();
        let raw = unsafe {
            ffi::vips_image_new_from_memory_copy(
                bytes.as_ptr() as *const c_void,
                bytes.len(),
                width,
                height,
                3,
                ffi::VIPS_FORMAT_UCHAR,
            )
        };
        Self::from_raw(raw).ok_or_else(|| Error::TransformFailed(take_vips_error()))
    }

    /// Run `vips_thumbnail` on a file.
    pub(crate) fn thumbnail(path: &Path, dimension: OutDimension) -> Result<Self> {
        let c_path = path_to_cstring(path)?;
        let mut out: *mut ffi::VipsImage = ptr::null_mut();
        let ret = match dimension {
            OutDimension::KeepAspect { width } => unsafe {
                ffi::vips_thumbnail(
                    c_path.as_ptr(),
                    &mut out,
                    to_c_int("width", width as usize)?,
                    ptr::null::<c_char>(),
                )
            },
            OutDimension::Crop { width, height } => unsafe {
                ffi::vips_thumbnail(
                    c_path.as_ptr(),
                    &mut out,
                    to_c_int("width", width as usize)?,
                    c"height".as_ptr(),
                    to_c_int("height", height as usize)?,
                    c"crop".as_ptr(),
                    ffi::VIPS_INTERESTING_ATTENTION,
                    ptr::null::<c_char>(),
                )
            },
        };
        // Owning `out` before checking `ret` releases a partial result too.
        let image = Self::from_raw(out);
        match image {
            Some(image) if ret == 0 => Ok(image),
            _ => Err(Error::TransformFailed(take_vips_error())),
        }
    }

    /// Resize by a multiplicative factor. `self` is left untouched.
    pub(crate) fn resize(&self, scale: f64) -> Result<Self> {
        let mut out: *mut ffi::VipsImage = ptr::null_mut();
        let ret =
            unsafe { ffi::vips_resize(self.as_ptr(), &mut out, scale, ptr::null::<c_char>()) };
        let image = Self::from_raw(out);
        match image {
            Some(image) if ret == 0 => Ok(image),
            _ => Err(Error::TransformFailed(take_vips_error())),
        }
    }

    /// Evaluate the pipeline into a memory image so it can be written
    /// several times without going back to the source file.
    pub(crate) fn copy_memory(&self) -> Result<Self> {
        let raw = unsafe { ffi::vips_image_copy_memory(self.as_ptr()) };
        Self::from_raw(raw).ok_or_else(|| Error::TransformFailed(take_vips_error()))
    }

    pub(crate) fn width(&self) -> u32 {
        unsafe { ffi::vips_image_get_width(self.as_ptr()) }.max(0) as u32
    }

    pub(crate) fn height(&self) -> u32 {
        unsafe { ffi::vips_image_get_height(self.as_ptr()) }.max(0) as u32
    }

    pub(crate) fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Whether the orientation tag implies a 90 or 270 degree rotation.
    pub(crate) fn orientation_swap(&self) -> bool {
        unsafe { ffi::vips_image_get_orientation_swap(self.as_ptr()) != 0 }
    }

    pub(crate) fn save_jpeg(&self, path: &Path, params: &JpegSaveParams) -> Result<()> {
        let c_path = path_to_cstring(path)?;
        let ret = unsafe {
            ffi::vips_jpegsave(
                self.as_ptr(),
                c_path.as_ptr(),
                c"Q".as_ptr(),
                c_int::from(params.quality),
                ptr::null::<c_char>(),
            )
        };
        encode_status(ret, path)
    }

    pub(crate) fn save_heif(&self, path: &Path, params: &HeifSaveParams) -> Result<()> {
        let c_path = path_to_cstring(path)?;
        let ret = unsafe {
            ffi::vips_heifsave(
                self.as_ptr(),
                c_path.as_ptr(),
                c"Q".as_ptr(),
                c_int::from(params.quality),
                c"bitdepth".as_ptr(),
                params.bit_depth.bits() as c_int,
                c"lossless".as_ptr(),
                params.lossless as ffi::gboolean,
                c"compression".as_ptr(),
                params.compression as c_int,
                ptr::null::<c_char>(),
            )
        };
        encode_status(ret, path)
    }

    pub(crate) fn save_webp(&self, path: &Path, params: &WebpSaveParams) -> Result<()> {
        let c_path = path_to_cstring(path)?;
        let ret = unsafe {
            ffi::vips_webpsave(
                self.as_ptr(),
                c_path.as_ptr(),
                c"Q".as_ptr(),
                c_int::from(params.quality),
                c"lossless".as_ptr(),
                params.lossless as ffi::gboolean,
                ptr::null::<c_char>(),
            )
        };
        encode_status(ret, path)
    }

    /// Write with the saver libvips picks from the file extension.
    pub(crate) fn write_to_file(&self, path: &Path) -> Result<()> {
        let c_path = path_to_cstring(path)?;
        let ret = unsafe {
            ffi::vips_image_write_to_file(self.as_ptr(), c_path.as_ptr(), ptr::null::<c_char>())
        };
        if ret != 0 {
            return Err(Error::WriteFailed {
                path: path.display().to_string(),
                message: take_vips_error(),
            });
        }
        Ok(())
    }
}

impl Drop for VipsImage {
    fn drop(&mut self) {
        unsafe { ffi::g_object_unref(self.ptr.as_ptr() as *mut c_void) };
        LIVE_IMAGES.fetch_sub(1, Ordering::SeqCst);
    }
}

fn encode_status(ret: c_int, path: &Path) -> Result<()> {
    if ret != 0 {
        return Err(Error::EncodeFailed {
            path: path.display().to_string(),
            message: take_vips_error(),
        });
    }
    Ok(())
}

fn to_c_int(name: &str, value: usize) -> Result<c_int> {
    c_int::try_from(value)
        .map_err(|_| Error::InvalidInput(format!("{} {} is out of range", name, value)))
}

/// Convert a filesystem path into the NUL-terminated form libvips expects.
pub(crate) fn path_to_cstring(path: &Path) -> Result<CString> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidInput("path must not be empty".into()));
    }

    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path
        .to_str()
        .ok_or_else(|| Error::InvalidInput(format!("path {} is not UTF-8", path.display())))?
        .as_bytes()
        .to_vec();

    CString::new(bytes).map_err(|_| {
        Error::InvalidInput(format!("path {} contains a NUL byte", path.display()))
    })
}

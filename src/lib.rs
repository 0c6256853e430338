//! # vipsx
//!
//! Safe, file-based image operations on top of libvips via FFI.
//!
//! This crate provides:
//! - Process-wide libvips initialization and teardown
//! - JPEG and HEIF/AVIF conversion with an optional resize step
//! - Thumbnails written to any number of output paths in one pass
//! - Orientation-aware header inspection
//! - An encoder self-check for startup diagnostics
//! - A C ABI (feature `capi`) with status-code results
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vipsx::{HeifSaveParams, OutDimension, RuntimeConfig, ThumbnailParams, Vips};
//!
//! let vips = Vips::init(RuntimeConfig::new("my-app"))?;
//!
//! // Dimensions as displayed, with EXIF rotation applied
//! let info = vips.read_image_info("photo.jpg")?;
//! println!("{}x{}", info.width, info.height);
//!
//! // Half-size AVIF
//! vips.convert_heif("photo.jpg", "photo.avif", &HeifSaveParams::new(), Some(0.5))?;
//!
//! // One 256px-wide thumbnail, written twice
//! vips.thumbnail(&ThumbnailParams {
//!     in_path: "photo.jpg".into(),
//!     out_paths: vec!["small.jpg".into(), "small.webp".into()],
//!     out_dimension: OutDimension::KeepAspect { width: 256 },
//! })?;
//!
//! vips.teardown();
//! # Ok::<(), vipsx::Error>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod config;
mod convert;
mod error;
mod ffi;
mod image;
mod info;
mod probe;
mod runtime;
mod thumbnail;
mod types;

#[cfg(feature = "capi")]
pub mod capi;

// Re-exports
pub use config::{BitDepth, Compression, HeifSaveParams, JpegSaveParams, RuntimeConfig, WebpSaveParams};
pub use error::{Error, Result, Status};
pub use runtime::Vips;
pub use types::{
    ConversionTarget, ConvertResult, EncoderSupport, FormatTarget, ImageInfo, OutDimension,
    RuntimeStats, Size, ThumbnailParams, ThumbnailResult,
};

/// Version of the linked libvips.
pub fn version() -> (u32, u32, u32) {
    let part = |flag| unsafe { ffi::vips_version(flag) }.max(0) as u32;
    (part(0), part(1), part(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let (major, minor, patch) = version();
        assert!(
            (major, minor) >= (8, 13),
            "Expected libvips 8.13+, got {}.{}.{}",
            major,
            minor,
            patch
        );
    }
}

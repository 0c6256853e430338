//! Plain value types passed into and out of operations.

use std::path::PathBuf;

use crate::config::{HeifSaveParams, JpegSaveParams};

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Information read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageInfo {
    /// Display width in pixels, after applying the orientation tag.
    pub width: u32,
    /// Display height in pixels, after applying the orientation tag.
    pub height: u32,
}

impl ImageInfo {
    /// Display size as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertResult {
    /// Width of the encoded image.
    pub width: u32,
    /// Height of the encoded image.
    pub height: u32,
}

/// Encoded output format for [`Vips::convert`](crate::Vips::convert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FormatTarget {
    /// JPEG
    Jpeg(JpegSaveParams),
    /// HEIF / AVIF
    Heif(HeifSaveParams),
}

impl FormatTarget {
    /// Short name used in logs and file extensions.
    pub fn name(&self) -> &'static str {
        match self {
            FormatTarget::Jpeg(_) => "jpeg",
            FormatTarget::Heif(params) => match params.compression {
                crate::Compression::Av1 => "avif",
                _ => "heif",
            },
        }
    }
}

/// Output format plus an optional uniform scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionTarget {
    /// Encoder and its parameters.
    pub format: FormatTarget,
    /// Multiplicative resize factor applied before encoding.
    pub scale: Option<f64>,
}

/// How a thumbnail is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutDimension {
    /// Fit the longer side into `width`, keeping the aspect ratio.
    KeepAspect {
        /// Bounding size in pixels.
        width: u32,
    },
    /// Produce exactly `width` x `height`, choosing the retained region with
    /// libvips' attention-based crop.
    Crop {
        /// Output width in pixels.
        width: u32,
        /// Output height in pixels.
        height: u32,
    },
}

/// Thumbnail request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailParams {
    /// Source image.
    pub in_path: PathBuf,
    /// Every path receives the same generated thumbnail, in order.
    pub out_paths: Vec<PathBuf>,
    /// Sizing policy.
    pub out_dimension: OutDimension,
}

/// Dimensions of the generated thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThumbnailResult {
    /// Actual thumbnail width.
    pub actual_width: u32,
    /// Actual thumbnail height.
    pub actual_height: u32,
}

impl ThumbnailResult {
    /// Actual size as a [`Size`].
    pub fn actual_size(&self) -> Size {
        Size::new(self.actual_width, self.actual_height)
    }
}

/// Which encoders the linked libvips could use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderSupport {
    /// JPEG encoding works.
    pub jpeg: bool,
    /// HEIF encoding with the default (AV1) compression works.
    pub heif: bool,
    /// WebP encoding works.
    pub webp: bool,
}

impl EncoderSupport {
    /// Whether every probed encoder works.
    pub fn all(&self) -> bool {
        self.jpeg && self.heif && self.webp
    }
}

/// Resource counters for leak checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeStats {
    /// Image handles owned by this crate that have not been released.
    pub live_images: usize,
    /// Allocations currently tracked by libvips.
    pub tracked_allocs: u64,
    /// Bytes currently tracked by libvips.
    pub tracked_mem: usize,
    /// Files currently held open by libvips.
    pub open_files: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Compression;

    #[test]
    fn test_format_names() {
        assert_eq!(FormatTarget::Jpeg(JpegSaveParams::new()).name(), "jpeg");
        assert_eq!(FormatTarget::Heif(HeifSaveParams::new()).name(), "avif");
        assert_eq!(
            FormatTarget::Heif(HeifSaveParams::new().compression(Compression::Hevc)).name(),
            "heif"
        );
    }

    #[test]
    fn test_encoder_support_all() {
        let mut support = EncoderSupport {
            jpeg: true,
            heif: true,
            webp: true,
        };
        assert!(support.all());
        support.heif = false;
        assert!(!support.all());
    }

    #[test]
    fn test_sizes() {
        let info = ImageInfo {
            width: 20,
            height: 10,
        };
        assert_eq!(info.size(), Size { width: 20, height: 10 });
        assert_eq!(ThumbnailResult::default().actual_size(), Size::default());
    }
}

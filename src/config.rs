//! Runtime and encoder configuration types.

use crate::error::{Error, Result};

/// Runtime configuration applied once when libvips is initialized.
///
/// # Example
///
/// ```rust,no_run
/// use vipsx::{RuntimeConfig, Vips};
///
/// let vips = Vips::init(
///     RuntimeConfig::new("photo-importer")
///         .concurrency(4)
///         .cache_max_operations(0),
/// )?;
/// # let _ = vips;
/// # Ok::<(), vipsx::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub(crate) program_name: String,
    pub(crate) concurrency: Option<u32>,
    pub(crate) cache_max_operations: Option<u32>,
    pub(crate) cache_max_memory: Option<usize>,
    pub(crate) leak_report: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program_name: "vipsx".into(),
            concurrency: None,
            cache_max_operations: None,
            cache_max_memory: None,
            leak_report: false,
        }
    }
}

impl RuntimeConfig {
    /// Create a configuration identifying the host program to libvips.
    #[must_use]
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            program_name: program_name.into(),
            ..Self::default()
        }
    }

    /// Number of libvips worker threads per pipeline (0 = libvips default).
    #[must_use]
    pub fn concurrency(mut self, threads: u32) -> Self {
        self.concurrency = Some(threads.min(1024));
        self
    }

    /// Maximum number of operations kept in the libvips operation cache.
    ///
    /// `0` disables caching, so no image outlives the call that produced it.
    #[must_use]
    pub fn cache_max_operations(mut self, max: u32) -> Self {
        self.cache_max_operations = Some(max);
        self
    }

    /// Maximum memory held by the libvips operation cache, in bytes.
    #[must_use]
    pub fn cache_max_memory(mut self, bytes: usize) -> Self {
        self.cache_max_memory = Some(bytes);
        self
    }

    /// Ask libvips to report leaked objects when it shuts down.
    #[must_use]
    pub fn leak_report(mut self, enable: bool) -> Self {
        self.leak_report = enable;
        self
    }

    /// Program name passed to libvips.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.program_name.is_empty() {
            return Err(Error::InvalidConfig("program name must not be empty".into()));
        }
        if self.program_name.contains('\0') {
            return Err(Error::InvalidConfig(
                "program name must not contain NUL bytes".into(),
            ));
        }
        if self.cache_max_operations.is_some_and(|max| max > i32::MAX as u32) {
            return Err(Error::InvalidConfig("operation cache limit too large".into()));
        }
        Ok(())
    }
}

/// JPEG encoder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JpegSaveParams {
    pub(crate) quality: u8,
}

impl Default for JpegSaveParams {
    fn default() -> Self {
        Self { quality: 75 }
    }
}

impl JpegSaveParams {
    /// Default JPEG parameters (quality 75).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set encoder quality (1 = smallest, 100 = best).
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Get the encoder quality.
    pub fn get_quality(&self) -> u8 {
        self.quality
    }

    /// Build from the raw C quality value, rejecting out-of-range input.
    pub(crate) fn from_raw(quality: i32) -> Result<Self> {
        Ok(Self {
            quality: checked_quality("JPEG", quality)?,
        })
    }
}

/// HEIF container compression, matching `VipsForeignHeifCompression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Compression {
    /// H.265
    Hevc = 1,
    /// H.264
    Avc = 2,
    /// JPEG
    Jpeg = 3,
    /// AV1 (AVIF)
    #[default]
    Av1 = 4,
}

impl TryFrom<i32> for Compression {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(Compression::Hevc),
            2 => Ok(Compression::Avc),
            3 => Ok(Compression::Jpeg),
            4 => Ok(Compression::Av1),
            _ => Err(Error::InvalidConfig(format!(
                "invalid HEIF compression id {}",
                value
            ))),
        }
    }
}

/// HEIF sample bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// 8 bits per sample
    #[default]
    Eight,
    /// 10 bits per sample
    Ten,
    /// 12 bits per sample
    Twelve,
}

impl BitDepth {
    /// Bits per sample.
    pub const fn bits(self) -> i32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Ten => 10,
            BitDepth::Twelve => 12,
        }
    }
}

impl TryFrom<i32> for BitDepth {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            8 => Ok(BitDepth::Eight),
            10 => Ok(BitDepth::Ten),
            12 => Ok(BitDepth::Twelve),
            _ => Err(Error::InvalidConfig(format!("invalid HEIF bit depth {}", value))),
        }
    }
}

/// HEIF encoder parameters. Defaults produce an 8-bit lossy AVIF at quality 50.
///
/// # Example
///
/// ```rust
/// use vipsx::{BitDepth, Compression, HeifSaveParams};
///
/// let params = HeifSaveParams::new()
///     .quality(60)
///     .bit_depth(BitDepth::Ten)
///     .compression(Compression::Hevc);
/// assert_eq!(params.get_quality(), 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeifSaveParams {
    pub(crate) quality: u8,
    pub(crate) lossless: bool,
    pub(crate) bit_depth: BitDepth,
    pub(crate) compression: Compression,
}

impl Default for HeifSaveParams {
    fn default() -> Self {
        Self {
            quality: 50,
            lossless: false,
            bit_depth: BitDepth::Eight,
            compression: Compression::Av1,
        }
    }
}

impl HeifSaveParams {
    /// Default HEIF parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set encoder quality (1 = smallest, 100 = best).
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Enable or disable lossless compression.
    #[must_use]
    pub fn lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }

    /// Set sample bit depth.
    #[must_use]
    pub fn bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Set container compression.
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Get the encoder quality.
    pub fn get_quality(&self) -> u8 {
        self.quality
    }

    /// Whether lossless compression is enabled.
    pub fn is_lossless(&self) -> bool {
        self.lossless
    }

    /// Get the sample bit depth.
    pub fn get_bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Get the container compression.
    pub fn get_compression(&self) -> Compression {
        self.compression
    }

    /// Build from raw C values, rejecting anything libvips would misread.
    pub(crate) fn from_raw(
        quality: i32,
        lossless: i32,
        bit_depth: i32,
        compression: i32,
    ) -> Result<Self> {
        Ok(Self {
            quality: checked_quality("HEIF", quality)?,
            lossless: lossless != 0,
            bit_depth: BitDepth::try_from(bit_depth)?,
            compression: Compression::try_from(compression)?,
        })
    }
}

/// WebP encoder parameters, used by the encoder self-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WebpSaveParams {
    pub(crate) quality: u8,
    pub(crate) lossless: bool,
}

impl Default for WebpSaveParams {
    fn default() -> Self {
        Self {
            quality: 75,
            lossless: false,
        }
    }
}

impl WebpSaveParams {
    /// Default WebP parameters (lossy, quality 75).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set encoder quality (1 = smallest, 100 = best).
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Enable or disable lossless compression.
    #[must_use]
    pub fn lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }
}

fn checked_quality(format: &str, quality: i32) -> Result<u8> {
    match quality {
        1..=100 => Ok(quality as u8),
        _ => Err(Error::InvalidConfig(format!(
            "invalid {} quality factor {}",
            format, quality
        ))),
    }
}

/// Validate a scale factor before it reaches `vips_resize`.
pub(crate) fn validate_scale(scale: Option<f64>) -> Result<()> {
    match scale {
        Some(factor) if !factor.is_finite() || factor <= 0.0 => Err(Error::InvalidInput(
            format!("scale factor must be finite and positive, got {}", factor),
        )),
        _ => Ok(()),
    }
}

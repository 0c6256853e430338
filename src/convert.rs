//! Format conversion with an optional resize step.

use std::path::Path;

use tracing::{debug, warn};

use crate::config::{validate_scale, HeifSaveParams, JpegSaveParams};
use crate::error::Result;
use crate::image::VipsImage;
use crate::runtime::Vips;
use crate::types::{ConversionTarget, ConvertResult, FormatTarget};

impl Vips {
    /// Convert an image to JPEG, optionally scaling it first.
    ///
    /// `scale` is a multiplicative factor (`Some(0.5)` halves both sides).
    /// The result holds the dimensions of the image that was encoded.
    pub fn convert_jpeg(
        &self,
        in_path: impl AsRef<Path>,
        out_path: impl AsRef<Path>,
        params: &JpegSaveParams,
        scale: Option<f64>,
    ) -> Result<ConvertResult> {
        self.convert(
            in_path,
            out_path,
            &ConversionTarget {
                format: FormatTarget::Jpeg(*params),
                scale,
            },
        )
    }

    /// Convert an image to HEIF, optionally scaling it first.
    ///
    /// With the default [`HeifSaveParams`] this produces an AVIF file.
    pub fn convert_heif(
        &self,
        in_path: impl AsRef<Path>,
        out_path: impl AsRef<Path>,
        params: &HeifSaveParams,
        scale: Option<f64>,
    ) -> Result<ConvertResult> {
        self.convert(
            in_path,
            out_path,
            &ConversionTarget {
                format: FormatTarget::Heif(*params),
                scale,
            },
        )
    }

    /// Convert an image to the format described by `target`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use vipsx::{ConversionTarget, FormatTarget, HeifSaveParams, RuntimeConfig, Vips};
    ///
    /// let vips = Vips::init(RuntimeConfig::default())?;
    /// let target = ConversionTarget {
    ///     format: FormatTarget::Heif(HeifSaveParams::new().quality(60)),
    ///     scale: None,
    /// };
    /// let result = vips.convert("photo.jpg", "photo.avif", &target)?;
    /// # let _ = result;
    /// # Ok::<(), vipsx::Error>(())
    /// ```
    pub fn convert(
        &self,
        in_path: impl AsRef<Path>,
        out_path: impl AsRef<Path>,
        target: &ConversionTarget,
    ) -> Result<ConvertResult> {
        let in_path = in_path.as_ref();
        let out_path = out_path.as_ref();
        let result = self.convert_paths(in_path, out_path, target);
        if let Err(err) = &result {
            warn!(
                input = %in_path.display(),
                output = %out_path.display(),
                format = target.format.name(),
                %err,
                "image conversion failed"
            );
        }
        result
    }

    #[tracing::instrument(level = "debug", skip(self, target), fields(format = target.format.name(), scale = ?target.scale))]
    fn convert_paths(
        &self,
        in_path: &Path,
        out_path: &Path,
        target: &ConversionTarget,
    ) -> Result<ConvertResult> {
        self.ensure_running()?;
        validate_scale(target.scale)?;

        let mut image = VipsImage::from_file(in_path)?;
        if let Some(factor) = target.scale {
            // Assigning drops the unscaled handle; on error it drops on return.
            image = image.resize(factor)?;
        }
        let size = image.size();

        match &target.format {
            FormatTarget::Jpeg(params) => image.save_jpeg(out_path, params)?,
            FormatTarget::Heif(params) => image.save_heif(out_path, params)?,
        }

        debug!(width = size.width, height = size.height, "converted image");
        Ok(ConvertResult {
            width: size.width,
            height: size.height,
        })
    }
}

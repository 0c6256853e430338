//! Thumbnail generation to one or more output paths.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::image::VipsImage;
use crate::runtime::Vips;
use crate::types::{OutDimension, ThumbnailParams, ThumbnailResult};

impl Vips {
    /// Generate one thumbnail and write it to every path in `out_paths`.
    ///
    /// Paths are written in order and the first failing write stops the
    /// loop. An empty `out_paths` is a no-op that returns a 0x0 result
    /// without checking `out_dimension` or opening the input.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use vipsx::{OutDimension, RuntimeConfig, ThumbnailParams, Vips};
    ///
    /// let vips = Vips::init(RuntimeConfig::default())?;
    /// let result = vips.thumbnail(&ThumbnailParams {
    ///     in_path: "photo.jpg".into(),
    ///     out_paths: vec!["thumb.webp".into(), "thumb.avif".into()],
    ///     out_dimension: OutDimension::Crop { width: 200, height: 100 },
    /// })?;
    /// assert_eq!((result.actual_width, result.actual_height), (200, 100));
    /// # Ok::<(), vipsx::Error>(())
    /// ```
    pub fn thumbnail(&self, params: &ThumbnailParams) -> Result<ThumbnailResult> {
        let result = self.thumbnail_with(
            &params.in_path,
            params.out_dimension,
            &params.out_paths,
            |_| {},
        );
        if let Err(err) = &result {
            warn!(input = %params.in_path.display(), %err, "thumbnail generation failed");
        }
        result
    }

    /// Shared by the Rust and C entry points. `on_generated` sees the result
    /// before any path is written, so callers can report dimensions even
    /// when a later write fails.
    #[tracing::instrument(level = "debug", skip(self, out_paths, on_generated), fields(outputs = out_paths.len()))]
    pub(crate) fn thumbnail_with<P: AsRef<Path>>(
        &self,
        in_path: &Path,
        out_dimension: OutDimension,
        out_paths: &[P],
        on_generated: impl FnOnce(&ThumbnailResult),
    ) -> Result<ThumbnailResult> {
        self.ensure_running()?;
        if out_paths.is_empty() {
            debug!("no output paths, nothing to do");
            return Ok(ThumbnailResult::default());
        }
        validate_dimension(out_dimension)?;

        let image = VipsImage::thumbnail(in_path, out_dimension)?.copy_memory()?;
        let result = ThumbnailResult {
            actual_width: image.width(),
            actual_height: image.height(),
        };
        on_generated(&result);

        for out_path in out_paths {
            image.write_to_file(out_path.as_ref())?;
        }

        debug!(
            width = result.actual_width,
            height = result.actual_height,
            "wrote thumbnail"
        );
        Ok(result)
    }
}

fn validate_dimension(dimension: OutDimension) -> Result<()> {
    match dimension {
        OutDimension::KeepAspect { width: 0 } | OutDimension::Crop { width: 0, .. } => Err(
            Error::InvalidInput("thumbnail width must be non-zero".into()),
        ),
        OutDimension::Crop { height: 0, .. } => Err(Error::InvalidInput(
            "thumbnail height must be non-zero".into(),
        )),
        _ => Ok(()),
    }
}

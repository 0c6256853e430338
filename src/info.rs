//! Header inspection.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::image::VipsImage;
use crate::runtime::Vips;
use crate::types::ImageInfo;

impl Vips {
    /// Read the display dimensions of an image without decoding its pixels.
    ///
    /// When the orientation tag says the image is stored rotated by 90 or
    /// 270 degrees, width and height are swapped.
    #[tracing::instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn read_image_info(&self, path: impl AsRef<Path>) -> Result<ImageInfo> {
        self.ensure_running()?;
        let image = VipsImage::from_file(path.as_ref())?;
        let (width, height) = (image.width(), image.height());
        let info = if image.orientation_swap() {
            ImageInfo {
                width: height,
                height: width,
            }
        } else {
            ImageInfo { width, height }
        };
        debug!(width = info.width, height = info.height, "read image header");
        Ok(info)
    }
}

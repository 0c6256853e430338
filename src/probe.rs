//! Encoder self-check.
//!
//! libvips resolves savers at runtime, so a build that links fine can still
//! lack HEIF or WebP support. Hosts call [`Vips::check_encoders`] at startup
//! to find out before the first real conversion fails.

use std::path::Path;

use imgref::ImgVec;
use rgb::RGB8;
use tracing::{debug, error};

use crate::config::{HeifSaveParams, JpegSaveParams, WebpSaveParams};
use crate::error::Result;
use crate::image::VipsImage;
use crate::runtime::Vips;
use crate::types::EncoderSupport;

const PROBE_SIZE: usize = 64;

impl Vips {
    /// Encode a small synthetic image as JPEG, HEIF (AV1) and WebP into `dir`.
    ///
    /// Each failing encoder is logged and reported as unsupported. Only a
    /// failure to build the synthetic image itself is returned as an error.
    #[tracing::instrument(level = "debug", skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub fn check_encoders(&self, dir: impl AsRef<Path>) -> Result<EncoderSupport> {
        self.ensure_running()?;
        let dir = dir.as_ref();
        let image = VipsImage::from_pixels(gradient(PROBE_SIZE, PROBE_SIZE).as_ref())?;

        let jpeg = report(
            "JPEG",
            image.save_jpeg(&dir.join("vipsx_probe.jpg"), &JpegSaveParams::default()),
        );
        let heif = report(
            "AVIF",
            image.save_heif(&dir.join("vipsx_probe.avif"), &HeifSaveParams::default()),
        );
        let webp = report(
            "WebP",
            image.save_webp(&dir.join("vipsx_probe.webp"), &WebpSaveParams::default()),
        );

        Ok(EncoderSupport { jpeg, heif, webp })
    }
}

fn report(format: &str, outcome: Result<()>) -> bool {
    match outcome {
        Ok(()) => {
            debug!("ok: can encode {} image", format);
            true
        }
        Err(err) => {
            error!(%err, "cannot encode {} image", format);
            false
        }
    }
}

/// Horizontal red / vertical green ramp, enough to give encoders real content.
fn gradient(width: usize, height: usize) -> ImgVec<RGB8> {
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            pixels.push(RGB8::new(
                ((x * 255) / width.max(1)) as u8,
                ((y * 255) / height.max(1)) as u8,
                128,
            ));
        }
    }
    ImgVec::new(pixels, width, height)
}

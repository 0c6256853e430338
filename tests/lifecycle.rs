//! Runtime lifecycle. Teardown is final for the process, so this binary holds
//! a single test.

use image::{Rgb, RgbImage};
use tempfile::TempDir;
use vipsx::*;

#[test]
fn test_init_use_teardown() {
    assert_eq!(Vips::get().unwrap_err(), Error::NotInitialized);

    let vips = Vips::init(RuntimeConfig::new("vipsx-lifecycle").concurrency(2)).unwrap();
    assert!(!vips.is_shut_down());
    assert_eq!(vips.config().program_name(), "vipsx-lifecycle");

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    RgbImage::from_pixel(40, 30, Rgb([10, 20, 30])).save(&input).unwrap();
    let info = vips.read_image_info(&input).unwrap();
    assert_eq!((info.width, info.height), (40, 30));

    vips.teardown();
    assert!(vips.is_shut_down());
    assert_eq!(vips.stats().live_images, 0);

    assert_eq!(vips.read_image_info(&input).unwrap_err(), Error::ShutDown);
    let err = vips
        .convert_jpeg(&input, dir.path().join("o.jpg"), &JpegSaveParams::new(), None)
        .unwrap_err();
    assert_eq!(err.status(), Status::ShutDown);
    assert_eq!(Vips::get().unwrap_err(), Error::ShutDown);
    assert_eq!(
        Vips::init(RuntimeConfig::default()).unwrap_err(),
        Error::ShutDown
    );

    // Second teardown is a no-op.
    vips.teardown();
    assert!(vips.is_shut_down());
}

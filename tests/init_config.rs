//! A rejected runtime config must not poison later initialization. Runs in
//! its own binary so nothing else has initialized libvips first.

use vipsx::*;

#[test]
fn test_rejected_config_then_valid_init() {
    #[cfg(feature = "capi")]
    {
        let status = unsafe { vipsx::capi::vipsx_init(c"".as_ptr()) };
        assert_eq!(status, Status::InvalidConfig as i32);
    }

    let err = Vips::init(RuntimeConfig::new("")).unwrap_err();
    assert_eq!(err.status(), Status::InvalidConfig);
    assert_eq!(Vips::get().unwrap_err(), Error::NotInitialized);

    let vips = Vips::init(RuntimeConfig::new("ok")).expect("valid config after a rejected one");
    assert_eq!(vips.config().program_name(), "ok");
    assert!(core::ptr::eq(vips, Vips::get().unwrap()));

    // Once running, a later config is ignored rather than validated.
    assert!(Vips::init(RuntimeConfig::new("")).is_ok());

    #[cfg(feature = "capi")]
    {
        let status = unsafe { vipsx::capi::vipsx_init(c"host".as_ptr()) };
        assert_eq!(status, 0);
    }
}

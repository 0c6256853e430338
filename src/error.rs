//! Error types for vipsx operations.

use core::fmt;
use std::ffi::CStr;

/// Result type for vipsx operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for vipsx operations.
///
/// Failures reported by libvips carry the diagnostic text libvips produced
/// for the failing call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input parameters (null pointers, empty paths, zero sizes, etc.)
    InvalidInput(String),
    /// Save or runtime configuration rejected before reaching libvips
    InvalidConfig(String),
    /// No operation is possible before [`Vips::init`](crate::Vips::init)
    NotInitialized,
    /// libvips has been shut down with [`Vips::teardown`](crate::Vips::teardown)
    ShutDown,
    /// libvips failed to initialize
    InitFailed(String),
    /// The input image could not be opened
    LoadFailed {
        /// Input path
        path: String,
        /// libvips diagnostic
        message: String,
    },
    /// Resizing or thumbnail generation failed
    TransformFailed(String),
    /// The encoder rejected the image or its parameters
    EncodeFailed {
        /// Output path
        path: String,
        /// libvips diagnostic
        message: String,
    },
    /// Writing an already generated image failed
    WriteFailed {
        /// Output path
        path: String,
        /// libvips diagnostic
        message: String,
    },
    /// A panic was caught at the C boundary
    Internal(String),
}

impl Error {
    /// Status code reported for this error at the C boundary.
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidInput(_) => Status::InvalidInput,
            Error::InvalidConfig(_) => Status::InvalidConfig,
            Error::NotInitialized => Status::NotInitialized,
            Error::ShutDown => Status::ShutDown,
            Error::InitFailed(_) => Status::InitFailed,
            Error::LoadFailed { .. } => Status::LoadFailed,
            Error::TransformFailed(_) => Status::TransformFailed,
            Error::EncodeFailed { .. } => Status::EncodeFailed,
            Error::WriteFailed { .. } => Status::WriteFailed,
            Error::Internal(_) => Status::Internal,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            Error::NotInitialized => write!(f, "libvips is not initialized"),
            Error::ShutDown => write!(f, "libvips has been shut down"),
            Error::InitFailed(msg) => write!(f, "libvips init failed: {}", msg),
            Error::LoadFailed { path, message } => {
                write!(f, "could not load {}: {}", path, message)
            }
            Error::TransformFailed(msg) => write!(f, "transform failed: {}", msg),
            Error::EncodeFailed { path, message } => {
                write!(f, "could not encode {}: {}", path, message)
            }
            Error::WriteFailed { path, message } => {
                write!(f, "could not write {}: {}", path, message)
            }
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Integer status codes used at the C boundary.
///
/// Library failures are positive, caller and lifecycle failures negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Status {
    /// Success
    Ok = 0,
    /// Input could not be loaded
    LoadFailed = 1,
    /// Resize or thumbnail generation failed
    TransformFailed = 2,
    /// Encoder failed
    EncodeFailed = 3,
    /// Writing an output path failed
    WriteFailed = 4,
    /// Caller contract violation
    InvalidInput = -1,
    /// Rejected save parameters
    InvalidConfig = -2,
    /// Library not initialized
    NotInitialized = -3,
    /// Library initialization failed
    InitFailed = -4,
    /// Library already shut down
    ShutDown = -5,
    /// Unexpected internal failure
    Internal = -6,
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        match code {
            0 => Status::Ok,
            1 => Status::LoadFailed,
            2 => Status::TransformFailed,
            3 => Status::EncodeFailed,
            4 => Status::WriteFailed,
            -1 => Status::InvalidInput,
            -2 => Status::InvalidConfig,
            -3 => Status::NotInitialized,
            -4 => Status::InitFailed,
            -5 => Status::ShutDown,
            _ => Status::Internal,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Status::Ok => "ok",
            Status::LoadFailed => "load failed",
            Status::TransformFailed => "transform failed",
            Status::EncodeFailed => "encode failed",
            Status::WriteFailed => "write failed",
            Status::InvalidInput => "invalid input",
            Status::InvalidConfig => "invalid config",
            Status::NotInitialized => "not initialized",
            Status::InitFailed => "init failed",
            Status::ShutDown => "shut down",
            Status::Internal => "internal error",
        };
        write!(f, "{}", msg)
    }
}

/// Take the pending libvips diagnostic and clear the error buffer.
///
/// The buffer is process-wide, so this is called right after the failing
/// call to keep messages attached to the right error.
pub(crate) fn take_vips_error() -> String {
    let message = unsafe {
        let buf = crate::ffi::vips_error_buffer();
        if buf.is_null() {
            String::new()
        } else {
            CStr::from_ptr(buf).to_string_lossy().trim_end().to_owned()
        }
    };
    unsafe { crate::ffi::vips_error_clear() };
    if message.is_empty() {
        "unknown libvips error".into()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_i32() {
        assert_eq!(Status::from(0), Status::Ok);
        assert_eq!(Status::from(1), Status::LoadFailed);
        assert_eq!(Status::from(2), Status::TransformFailed);
        assert_eq!(Status::from(3), Status::EncodeFailed);
        assert_eq!(Status::from(4), Status::WriteFailed);
        assert_eq!(Status::from(-1), Status::InvalidInput);
        assert_eq!(Status::from(-5), Status::ShutDown);
        assert_eq!(Status::from(42), Status::Internal);
    }

    #[test]
    fn test_status_roundtrips_through_repr() {
        for status in [
            Status::Ok,
            Status::LoadFailed,
            Status::WriteFailed,
            Status::InvalidConfig,
            Status::InitFailed,
        ] {
            assert_eq!(Status::from(status as i32), status);
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let load = Error::LoadFailed {
            path: "a.jpg".into(),
            message: "no such file".into(),
        };
        assert_eq!(load.status(), Status::LoadFailed);
        assert_eq!(
            Error::InvalidInput("null".into()).status() as i32,
            -1,
            "contract violations map to -1"
        );
        assert_eq!(Error::NotInitialized.status(), Status::NotInitialized);
    }

    #[test]
    fn test_error_display() {
        let errors = [
            (Error::InvalidInput("test".into()), "invalid input: test"),
            (Error::InvalidConfig("bad".into()), "invalid config: bad"),
            (Error::NotInitialized, "libvips is not initialized"),
            (Error::ShutDown, "libvips has been shut down"),
            (
                Error::LoadFailed {
                    path: "in.png".into(),
                    message: "not a known file format".into(),
                },
                "could not load in.png: not a known file format",
            ),
            (
                Error::TransformFailed("resize".into()),
                "transform failed: resize",
            ),
            (
                Error::WriteFailed {
                    path: "out.jpg".into(),
                    message: "permission denied".into(),
                },
                "could not write out.jpg: permission denied",
            ),
        ];

        for (error, expected) in errors {
            assert_eq!(format!("{}", error), expected);
        }
    }
}

//! libvips / GObject bindings generated from `vips/vips.h` at build time.
//!
//! Optional arguments of the variadic operations are passed as `name, value`
//! pairs terminated by a null pointer, exactly as in C.

#![allow(
    dead_code,
    improper_ctypes,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    clippy::all
)]

include!(concat!(env!("OUT_DIR"), "/vips_bindings.rs"));

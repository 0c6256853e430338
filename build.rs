use std::env;
use std::path::PathBuf;

/// libvips and GObject entry points used by the crate.
const FUNCTIONS: &[&str] = &[
    "vips_init",
    "vips_shutdown",
    "vips_version",
    "vips_concurrency_set",
    "vips_cache_set_max",
    "vips_cache_set_max_mem",
    "vips_leak_set",
    "vips_error_buffer",
    "vips_error_clear",
    "vips_tracked_get_allocs",
    "vips_tracked_get_mem",
    "vips_tracked_get_files",
    "vips_image_new_from_file",
    "vips_image_new_from_memory_copy",
    "vips_image_copy_memory",
    "vips_image_get_width",
    "vips_image_get_height",
    "vips_image_get_orientation_swap",
    "vips_resize",
    "vips_thumbnail",
    "vips_jpegsave",
    "vips_heifsave",
    "vips_webpsave",
    "vips_image_write_to_file",
    "g_object_unref",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");

    // vips.pc pulls in glib-2.0 and gobject-2.0 through Requires.
    let vips = pkg_config::Config::new()
        .atleast_version("8.13")
        .probe("vips")
        .unwrap_or_else(|err| panic!("libvips >= 8.13 not found via pkg-config: {err}"));

    for path in &vips.include_paths {
        println!("cargo:include={}", path.display());
    }

    let mut builder = bindgen::Builder::default()
        .header_contents("vipsx.h", "#include <vips/vips.h>\n")
        .clang_args(
            vips.include_paths
                .iter()
                .map(|path| format!("-I{}", path.display())),
        )
        .allowlist_type("VipsInteresting")
        .allowlist_type("VipsBandFormat")
        .prepend_enum_name(false)
        .layout_tests(false)
        .wrap_unsafe_ops(true)
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()));
    for function in FUNCTIONS {
        builder = builder.allowlist_function(function);
    }

    let bindings = builder
        .generate()
        .unwrap_or_else(|err| panic!("could not generate libvips bindings: {err}"));
    let out_path = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    bindings
        .write_to_file(out_path.join("vips_bindings.rs"))
        .unwrap_or_else(|err| panic!("could not write libvips bindings: {err}"));
}

/// Name of the upstream product; release roots are `{PRODUCT_NAME}-{version}`.
pub const PRODUCT_NAME: &str = "ots";

pub const DEFAULT_RELEASE_URL: &str =
  "https://github.com/khaledhosny/ots/releases/download/v{version}/ots-{version}.tar.xz";

pub const VERSION_PLACEHOLDER: &str = "{version}";

pub const MANIFEST_FILE: &str = "meson.build";
pub const ORIGINAL_MANIFEST_FILE: &str = "meson.build.orig";

/// Written by `meson setup`; its presence means the build dir is configured.
pub const CONFIGURED_MARKER: &str = "build.ninja";

pub const SUBPROJECTS_DIR: &str = "subprojects";

pub const MAIN_LIBRARY: &str = "libots.a";

pub const SHA256_HEX_LEN: usize = 64;

//! otsprep-lib: provisioning pipeline for a vendored OTS source tree
//!
//! The pipeline runs in four sequential stages:
//! - `fetch`: download the pinned release archive, verify it, unpack it and
//!   patch its build manifest
//! - `build`: drive `meson`/`ninja` over the unpacked tree
//! - `resolve`: locate the static libraries and include directories the
//!   downstream extension links against
//! - `pipeline`: thread a `BuildContext` through all of the above

pub mod archive;
pub mod build;
pub mod config;
pub mod consts;
pub mod fetch;
pub mod integrity;
pub mod manifest;
pub mod pipeline;
pub mod release;
pub mod resolve;
pub mod source;

#[cfg(test)]
pub(crate) mod testutil;

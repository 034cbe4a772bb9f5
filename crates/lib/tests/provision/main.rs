//! End-to-end provisioning tests against a local release server and stub
//! build tools.

#![cfg(unix)]

// Archive and stub-tool builders shared with the unit tests.
#[allow(dead_code)]
#[path = "../../src/testutil.rs"]
mod testutil;

mod common;
mod pipeline_tests;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![allow(
    missing_docs,
    reason = "Private API, public API is documented in `profmem` package"
)]

mod args;
pub mod memory_usage;
pub mod profile_with_memory_usage;
pub mod profiled;
mod syn_helpers;

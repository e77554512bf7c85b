//! Support code for the macros. Not part of the public API.

use std::io;
use std::sync::Mutex;

use crate::function_id::shorten;
use crate::memory_usage::measure;
use crate::pal::PlatformFacade;
use crate::profiled::profile;
use crate::{FunctionId, SortKey};

/// Body of a function annotated with `#[profmem::memory_usage]`.
#[cfg_attr(test, mutants::skip)] // Exercised by the integration tests of the attribute macros.
pub fn memory_usage<R>(name: &'static str, f: impl FnOnce() -> R) -> R {
    let output = Mutex::new(io::stdout());

    measure(&PlatformFacade::real(), name, &output, f)
        .unwrap_or_else(|error| panic!("memory usage of {name}: {error}"))
}

/// Body of a function annotated with `#[profmem::profile_with_memory_usage]`.
#[cfg_attr(test, mutants::skip)] // Exercised by the integration tests of the attribute macros.
pub fn profile_with_memory_usage<R>(
    function: FunctionId,
    sort_key: SortKey,
    f: impl FnOnce() -> R,
) -> R {
    let output = Mutex::new(io::stdout());

    profile(&PlatformFacade::real(), &function, sort_key, &output, f).unwrap_or_else(|error| {
        panic!("profile with memory usage of {}: {error}", function.name())
    })
}

/// Turns the type name of a marker function nested in some function into the short name of
/// that enclosing function.
#[must_use]
pub fn enclosing_function_name(marker_type_name: &'static str) -> &'static str {
    let enclosing = marker_type_name
        .rsplit_once("::")
        .map_or(marker_type_name, |(parent, _)| parent);

    shorten(enclosing)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn enclosing_function_of_marker() {
        assert_eq!(
            enclosing_function_name("my_crate::jobs::load::__profmem_marker"),
            "load"
        );
        assert_eq!(
            enclosing_function_name("my_crate::jobs::load::{{closure}}::__profmem_marker"),
            "load"
        );
        assert_eq!(enclosing_function_name("__profmem_marker"), "__profmem_marker");
    }

    #[test]
    fn enclosing_trait_method_of_marker() {
        assert_eq!(
            enclosing_function_name("<my_crate::Worker as my_crate::Job>::run_job::__profmem_marker"),
            "run_job"
        );
    }

    #[test]
    fn memory_usage_returns_result() {
        assert_eq!(memory_usage("answer", || 42), 42);
    }

    #[test]
    fn profile_with_memory_usage_returns_result() {
        let result = profile_with_memory_usage(
            FunctionId::here("answer"),
            SortKey::Calls,
            || "forty-two",
        );

        assert_eq!(result, "forty-two");
    }
}

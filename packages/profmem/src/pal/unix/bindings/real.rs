use std::{io, mem};

use libc::{RUSAGE_SELF, rusage};

use crate::pal::unix::bindings::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    #[cfg_attr(test, mutants::skip)] // Real OS call, covered by integration tests.
    fn getrusage_self_max_rss(&self) -> io::Result<i64> {
        // SAFETY: All-zero is a valid initial value for this type.
        let mut usage: rusage = unsafe { mem::zeroed() };

        // SAFETY: We are passing valid arguments, no other safety requirements.
        let result = unsafe { libc::getrusage(RUSAGE_SELF, &raw mut usage) };

        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        // `c_long` is 32 bits on some targets.
        #[allow(
            clippy::useless_conversion,
            reason = "only a no-op on targets where c_long is already 64 bits"
        )]
        Ok(i64::from(usage.ru_maxrss))
    }
}

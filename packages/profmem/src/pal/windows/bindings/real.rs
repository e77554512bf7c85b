use std::{io, mem};

use ::windows::Win32::System::ProcessStatus::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use ::windows::Win32::System::Threading::GetCurrentProcess;

use crate::pal::windows::bindings::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    #[cfg_attr(test, mutants::skip)] // Real OS call, covered by integration tests.
    fn peak_working_set_size(&self) -> io::Result<usize> {
        let mut counters = PROCESS_MEMORY_COUNTERS::default();

        let size = u32::try_from(mem::size_of::<PROCESS_MEMORY_COUNTERS>())
            .expect("PROCESS_MEMORY_COUNTERS is a small fixed-size structure");

        // SAFETY: No safety requirements. The pseudo-handle does not need to be closed.
        let process = unsafe { GetCurrentProcess() };

        // SAFETY: We pass a valid pointer to a structure of the size we declare.
        unsafe { GetProcessMemoryInfo(process, &raw mut counters, size) }
            .map_err(io::Error::other)?;

        Ok(counters.PeakWorkingSetSize)
    }
}

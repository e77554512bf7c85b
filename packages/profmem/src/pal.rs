//! Platform abstraction layer.
//!
//! Everything that asks the operating system about the process goes through the [`Platform`]
//! trait so unit tests can substitute a fake with fully controlled readings.

mod abstractions;
mod facade;

pub(crate) use abstractions::*;
pub(crate) use facade::*;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use self::windows::*;

#[cfg(not(any(unix, windows)))]
mod unsupported;
#[cfg(not(any(unix, windows)))]
pub(crate) use unsupported::*;

#[cfg(test)]
mod fake;
#[cfg(test)]
pub(crate) use fake::*;

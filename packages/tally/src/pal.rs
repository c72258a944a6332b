//! Platform abstraction layer for wall-clock time.
//!
//! Measurements read time through this layer so that tests can substitute a fake clock
//! whose time only advances when the test says so.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;

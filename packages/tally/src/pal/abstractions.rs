//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides monotonic wall-clock time.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Gets the current time, expressed as the duration since an arbitrary origin
    /// that stays fixed for the lifetime of the platform instance.
    fn now(&self) -> Duration;
}

//! Classifies the items produced by a measured iterator as successes or failures.

use crate::Sealed;

/// Decides whether an item produced by a measured iterator represents a failed step.
///
/// Wrappers that report once per iterator ([`MeasureAll`][crate::MeasureAll],
/// [`MeasureFirst`][crate::MeasureFirst]) stop measuring at the first failed step: the
/// measurement is reported, the failed item is handed to the consumer unchanged and the
/// wrapper then ends.
///
/// This trait is sealed and can only be implemented in the `tally` crate.
#[expect(private_bounds, reason = "intentional - sealed trait")]
pub trait Outcome<T>: Sealed {
    /// Whether `item` is the result of a failed production step.
    fn is_failure(item: &T) -> bool;
}

/// Every item is a success. Failures can only surface as panics.
#[derive(Debug)]
#[non_exhaustive]
pub struct Plain;

impl Sealed for Plain {}

impl<T> Outcome<T> for Plain {
    fn is_failure(_item: &T) -> bool {
        false
    }
}

/// Items are `Result`s and an `Err` is a failed step.
#[derive(Debug)]
#[non_exhaustive]
pub struct Fallible;

impl Sealed for Fallible {}

impl<T, E> Outcome<Result<T, E>> for Fallible {
    fn is_failure(item: &Result<T, E>) -> bool {
        item.is_err()
    }
}

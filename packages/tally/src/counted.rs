//! Iterator wrapper that counts the items pulled through it.

use std::iter::FusedIterator;

/// Counts how many items have been pulled from the iterator it wraps.
///
/// Reducing wrappers hand one of these to the function being measured in place of the
/// original sequence, so the measurement reports the items the function actually consumed
/// rather than the length of its input.
///
/// # Examples
///
/// ```
/// use tally::Counted;
///
/// let mut cursor = Counted::new(1..=10);
/// let first_three: Vec<_> = cursor.by_ref().take(3).collect();
///
/// assert_eq!(first_three, [1, 2, 3]);
/// assert_eq!(cursor.pulled(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Counted<I> {
    inner: I,
    pulled: u64,
}

impl<I> Counted<I>
where
    I: Iterator,
{
    /// Wraps an iterator, starting the count at zero.
    #[must_use]
    pub fn new(inner: I) -> Self {
        Self { inner, pulled: 0 }
    }

    /// The number of items pulled so far.
    #[must_use]
    pub fn pulled(&self) -> u64 {
        self.pulled
    }
}

impl<I> Iterator for Counted<I>
where
    I: Iterator,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;

        self.pulled = self
            .pulled
            .checked_add(1)
            .expect("pulled item count overflows u64 - this indicates an unrealistic scenario");

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I> FusedIterator for Counted<I> where I: FusedIterator {}

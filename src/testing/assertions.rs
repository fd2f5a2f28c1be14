//! Assertion functions for stream outputs.

use crate::consume::consume;
use crate::error::failure;
use crate::stream::ReadStream;
use std::fmt::Debug;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// # Example
///
/// ```
/// use pullflow::testing::assert_collections_equal;
///
/// assert_collections_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// Drain `stream`, assert it yields exactly `expected` and ends cleanly,
/// then close it.
///
/// # Panics
///
/// Panics if the stream fails, yields different items, or fails to close.
pub fn assert_stream_yields<S>(mut stream: S, expected: &[S::Item])
where
    S: ReadStream,
    S::Item: Debug + PartialEq,
{
    let actual = match consume(&mut stream) {
        Ok(items) => items,
        Err(e) => panic!("Stream failed: {e}"),
    };
    assert_collections_equal(&actual, expected);
    if let Err(e) = stream.close() {
        panic!("Stream failed to close: {e}");
    }
}

/// Drain `stream`, assert it ends with a failure, and return the items read
/// before it together with the failure message.
///
/// # Panics
///
/// Panics if the stream ends cleanly.
pub fn assert_stream_fails<S>(mut stream: S) -> (Vec<S::Item>, String)
where
    S: ReadStream,
    S::Item: Debug,
{
    let mut items = Vec::new();
    while stream.advance() {
        items.push(stream.current());
    }
    match failure(stream.error()) {
        Some(e) => (items, e.to_string()),
        None => panic!("Expected stream to fail, but it ended cleanly after {items:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::source::MemorySource;

    #[test]
    #[should_panic(expected = "Collection mismatch at index 1")]
    fn reports_first_mismatch() {
        assert_collections_equal(&[1, 2], &[1, 3]);
    }

    #[test]
    fn collects_items_before_failure() {
        let (items, msg) =
            assert_stream_fails(MemorySource::with_error(vec!['a'], StreamError::msg("nope")));
        assert_eq!(items, vec!['a']);
        assert_eq!(msg, "nope");
    }
}

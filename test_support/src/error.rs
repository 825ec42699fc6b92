//! Error rendering for assertions.

use std::error::Error;

/// Render `err` followed by each of its causes, separated by `": "`.
///
/// Request errors wrap transport, decode and fixture failures several
/// levels deep; flattening them lets a test assert on the root cause with a
/// single `contains` check.
///
/// # Examples
///
/// ```
/// use test_support::error::error_chain;
///
/// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such fixture");
/// assert_eq!(error_chain(&io), "no such fixture");
/// ```
#[must_use]
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut causes = Vec::new();
    let mut next = Some(err);
    while let Some(current) = next {
        causes.push(current.to_string());
        next = current.source();
    }
    causes.join(": ")
}

//! Redacting wrapper for secrets
//!
//! Anon keys and session access tokens travel through config structs and
//! session values that get logged with `{:?}`. Wrapping them in
//! [`Sensitive`] keeps them out of every log line.

use std::fmt;

/// Wrapper that prints `***REDACTED***` in Debug and Display
///
/// # Example
///
/// ```
/// use sitecontent_core_types::Sensitive;
///
/// let token = Sensitive::new("eyJhbGciOi");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(token.expose(), &"eyJhbGciOi");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value, e.g. to build an Authorization header
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl From<String> for Sensitive<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

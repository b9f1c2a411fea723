//! Captured route variable storage.
//!
//! Stores the `(name, raw value)` pairs extracted by a parametric match.
//! Values are kept exactly as they appeared in the path; percent-decoding is
//! a later, explicit step.

use smallvec::SmallVec;

/// Most routes capture no more than this many variables, so storage up to
/// this size stays on the stack.
const INLINE_VARS: usize = 4;

/// Variables captured by a parametric route match.
///
/// # Example
///
/// ```rust
/// use alacrity_router::Params;
///
/// let mut vars = Params::new();
/// vars.push("kid", "k-12");
/// assert_eq!(vars.get("kid"), Some("k-12"));
/// assert_eq!(vars.get("other"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_VARS]>,
}

impl Params {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured variable.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the raw captured value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over the `(name, raw value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

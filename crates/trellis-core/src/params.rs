//! Path parameter storage.
//!
//! Matching a template such as `/users/{id:int}` yields two views of the
//! same variables: [`Params`] holds the raw segment text, [`PathValues`]
//! holds the value parsed according to the declared type.
//!
//! Both use small-vector storage so the common case (1-4 variables) does
//! not allocate.

use smallvec::SmallVec;
use std::fmt;
use uuid::Uuid;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Raw path parameters, in template order.
///
/// # Example
///
/// ```rust
/// use trellis_core::Params;
///
/// let mut params = Params::new();
/// params.push("userId", "123");
///
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// A path variable parsed according to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValue {
    /// Declared as `int`.
    Int(i64),
    /// Declared as `string`.
    String(String),
    /// Declared as `uuid`.
    Uuid(Uuid),
}

impl PathValue {
    /// Returns the integer value, if this is an `int` variable.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is a `string` variable.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the UUID value, if this is a `uuid` variable.
    #[must_use]
    pub const fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Uuid(v) => write!(f, "{v}"),
        }
    }
}

/// Typed path values, in template order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathValues {
    inner: SmallVec<[(String, PathValue); INLINE_PARAMS]>,
}

impl PathValues {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a typed value.
    pub fn push(&mut self, name: impl Into<String>, value: PathValue) {
        self.inner.push((name.into(), value));
    }

    /// Returns the value for a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PathValue> {
        self.inner.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathValue)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        params.push("id", "123");
        params.push("name", "alice");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_params_iter_keeps_order() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_params_spill_past_inline_capacity() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
    }

    #[test]
    fn test_params_from_iterator() {
        let params: Params = vec![("a".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(params.get("a"), Some("1"));
    }

    #[test]
    fn test_path_value_accessors() {
        let id = Uuid::now_v7();

        assert_eq!(PathValue::Int(42).as_int(), Some(42));
        assert_eq!(PathValue::Int(42).as_str(), None);
        assert_eq!(PathValue::String("x".into()).as_str(), Some("x"));
        assert_eq!(PathValue::Uuid(id).as_uuid(), Some(id));
        assert_eq!(PathValue::Int(-3).to_string(), "-3");
    }

    #[test]
    fn test_path_values_lookup() {
        let mut values = PathValues::new();
        values.push("id", PathValue::Int(7));
        values.push("slug", PathValue::String("hello".into()));

        assert_eq!(values.get("id"), Some(&PathValue::Int(7)));
        assert_eq!(values.get("slug").and_then(PathValue::as_str), Some("hello"));
        assert!(values.get("missing").is_none());
        assert_eq!(values.iter().count(), 2);
    }

    proptest::proptest! {
        #[test]
        fn prop_first_binding_wins(
            pairs in proptest::collection::vec(("[a-c]", "[0-9]{1,3}"), 0..12)
        ) {
            let params: Params = pairs.iter().cloned().collect();
            proptest::prop_assert_eq!(params.len(), pairs.len());

            for (name, _) in &pairs {
                let first = pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str());
                proptest::prop_assert_eq!(params.get(name), first);
            }
        }
    }
}

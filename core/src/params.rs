//! Multi-valued request parameter bag.
//!
//! # Design
//! `Params` has value semantics: every fetch function takes it by value and
//! every pagination step clones the stored bag before changing the cursor, so
//! a page's own parameters are never modified after it was fetched.

use std::collections::BTreeMap;
use std::str::FromStr;

/// String-keyed, multi-valued parameters with query/form semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, Vec<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value under `key` parsed as `T`; `None` when absent or unparsable.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    /// True when `key` holds at least one non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Replace all values under `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), vec![value.into()]);
        self
    }

    pub fn set_uint(&mut self, key: impl Into<String>, value: u64) -> &mut Self {
        self.set(key, value.to_string())
    }

    /// Append `value` to the values under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.entry(key.into()).or_default().push(value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    /// Builder form of `set`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every `(key, value)` pair, keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
    }

    /// `application/x-www-form-urlencoded` rendering, usable as a query string.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

/// Shortcut for the `id` parameter every post write carries.
pub(crate) fn with_post_id(mut params: Params, id: u64) -> Params {
    params.set_uint("id", id);
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_is_independent_of_source() {
        let orig = Params::new().with("offset", "20");
        let mut copied = orig.clone();
        copied.set("offset", "40").set("key", "value");
        assert_eq!(orig.get("offset"), Some("20"));
        assert_eq!(orig.get("key"), None);
        assert_eq!(copied.get("offset"), Some("40"));
    }

    #[test]
    fn set_replaces_and_add_appends() {
        let mut params = Params::new();
        params.add("tag", "a").add("tag", "b");
        assert_eq!(params.get_all("tag"), ["a", "b"]);
        params.set("tag", "c");
        assert_eq!(params.get_all("tag"), ["c"]);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn set_uint_sets_single_key() {
        let mut params = Params::new();
        params.set_uint("key", 1986);
        assert_eq!(params.get("key"), Some("1986"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn post_id_shortcut() {
        let params = with_post_id(Params::new(), 1986);
        assert_eq!(params.get("id"), Some("1986"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn get_parsed_ignores_garbage() {
        let params = Params::new().with("offset", "abc").with("limit", "7");
        assert_eq!(params.get_parsed::<u64>("offset"), None);
        assert_eq!(params.get_parsed::<u64>("limit"), Some(7));
        assert_eq!(params.get_parsed::<u64>("missing"), None);
    }

    #[test]
    fn empty_value_is_not_set() {
        let params = Params::new().with("offset", "");
        assert!(params.contains("offset"));
        assert!(!params.is_set("offset"));
    }

    #[test]
    fn encode_escapes_values() {
        let params: Params = [("tag", "cute cats"), ("limit", "3")].into_iter().collect();
        assert_eq!(params.encode(), "limit=3&tag=cute+cats");
    }
}

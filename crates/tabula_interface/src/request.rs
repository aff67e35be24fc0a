//! Request parameter seam.

use std::collections::{BTreeMap, HashMap};
use tabula_core::ParamValue;

/// Read-only access to raw request parameters.
pub trait RequestParams {
    /// Raw value of `key`, if the request carried it.
    fn param(&self, key: &str) -> Option<&ParamValue>;
}

impl<T> RequestParams for &T
where
    T: RequestParams + ?Sized,
{
    fn param(&self, key: &str) -> Option<&ParamValue> {
        (**self).param(key)
    }
}

impl RequestParams for HashMap<String, ParamValue> {
    fn param(&self, key: &str) -> Option<&ParamValue> {
        self.get(key)
    }
}

impl RequestParams for BTreeMap<String, ParamValue> {
    fn param(&self, key: &str) -> Option<&ParamValue> {
        self.get(key)
    }
}

/// Parameters decoded from an `application/x-www-form-urlencoded` string.
///
/// Repeated keys and keys written with a `[]` suffix collect into
/// [`ParamValue::Many`]; a leading `?` or `&` is ignored.
///
/// # Examples
///
/// ```
/// use tabula_core::ParamValue;
/// use tabula_interface::{RawParams, RequestParams};
///
/// let params = RawParams::parse("?page=2&ids[]=4&ids[]=7");
/// assert_eq!(params.param("page"), Some(&ParamValue::from("2")));
/// assert_eq!(params.param("ids"), Some(&ParamValue::from(vec!["4", "7"])));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    values: BTreeMap<String, ParamValue>,
}

impl RawParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a query string or form body.
    pub fn parse(input: &str) -> Self {
        let input = input.trim_start_matches('?');
        let mut params = Self::new();
        for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            match key.strip_suffix("[]") {
                Some(base) => params.push_many(base, value.into_owned()),
                None => params.push(key.into_owned(), value.into_owned()),
            }
        }
        params
    }

    /// Set `key` to a single value, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push(&mut self, key: String, value: String) {
        match self.values.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.values.insert(key, ParamValue::Single(value));
            }
        }
    }

    fn push_many(&mut self, key: &str, value: String) {
        match self.values.get_mut(key) {
            Some(existing) => existing.push(value),
            None => {
                self.values
                    .insert(key.to_string(), ParamValue::Many(vec![value]));
            }
        }
    }
}

impl RequestParams for RawParams {
    fn param(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }
}

impl<K, V> FromIterator<(K, V)> for RawParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

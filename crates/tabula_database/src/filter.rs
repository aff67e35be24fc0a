//! Request parameter validation.
//!
//! Every external input is run through a [`FilterSpec`] before it can reach
//! query assembly. Failed values are never errors: they are dropped and,
//! depending on the rule, replaced by a default.

use regex::Regex;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::LazyLock;
use tabula_core::{
    DEFAULT_PAGE, KEY_FILTER_COLUMN, KEY_FILTER_TEXT, KEY_PAGE, KEY_ROWS, KEY_SORT_COLUMN,
    KEY_SORT_DIRECTION, NormalizedQueryParams, ParamValue, SortDirection,
};
use tabula_interface::RequestParams;
use tracing::{debug, instrument};

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*(>|$)").expect("markup pattern is valid"));

static DIRECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(asc|desc)$").expect("direction pattern is valid"));

/// Strip markup tags and NUL bytes from a text value.
///
/// An unterminated tag swallows the rest of the value.
///
/// # Examples
///
/// ```
/// use tabula_database::strip_tags;
///
/// assert_eq!(strip_tags("<b>bold</b> move"), "bold move");
/// assert_eq!(strip_tags("a < b"), "a ");
/// ```
pub fn strip_tags(value: &str) -> String {
    MARKUP.replace_all(value, "").replace('\0', "")
}

/// Value type a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleKind {
    /// Free text, sanitized of markup
    #[default]
    Text,
    /// Signed integer
    Integer,
}

/// What happens to a key whose value fails its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnInvalid {
    /// Substitute the rule's default, when it has one
    #[default]
    UseDefault,
    /// Leave the key out of the result
    Omit,
}

/// Validation rule for one parameter key.
///
/// # Examples
///
/// ```
/// use tabula_database::FilterRule;
///
/// let rows = FilterRule::integer().with_min(1).with_default_value(20);
/// assert_eq!(rows.min(), &Some(1));
/// ```
#[derive(Debug, Clone, derive_getters::Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct FilterRule {
    /// Accepted value type
    kind: RuleKind,
    /// Inclusive lower bound for integers
    #[setters(strip_option)]
    min: Option<i64>,
    /// Value used when the key is absent or invalid
    #[setters(strip_option, into)]
    default_value: Option<JsonValue>,
    /// Accept sequences and keep their valid elements
    force_array: bool,
    /// Pattern a text value must match
    #[setters(strip_option)]
    pattern: Option<Regex>,
    /// Key must be present and non-empty
    required: bool,
    /// Handling of values that fail the rule
    on_invalid: OnInvalid,
}

impl FilterRule {
    fn of(kind: RuleKind) -> Self {
        Self {
            kind,
            min: None,
            default_value: None,
            force_array: false,
            pattern: None,
            required: false,
            on_invalid: OnInvalid::UseDefault,
        }
    }

    /// Rule accepting sanitized free text.
    pub fn text() -> Self {
        Self::of(RuleKind::Text)
    }

    /// Rule accepting integers.
    pub fn integer() -> Self {
        Self::of(RuleKind::Integer)
    }

    fn apply_scalar(&self, raw: &str) -> Option<JsonValue> {
        match self.kind {
            RuleKind::Text => {
                let clean = strip_tags(raw);
                match &self.pattern {
                    Some(pattern) if !pattern.is_match(&clean) => None,
                    _ => Some(JsonValue::String(clean)),
                }
            }
            RuleKind::Integer => {
                let value = raw.trim().parse::<i64>().ok()?;
                match self.min {
                    Some(min) if value < min => None,
                    _ => Some(JsonValue::from(value)),
                }
            }
        }
    }

    /// Validate one raw value, `None` when it fails the rule.
    fn apply(&self, raw: &ParamValue) -> Option<JsonValue> {
        match (raw, self.force_array) {
            (ParamValue::Single(value), false) => self.apply_scalar(value),
            (ParamValue::Single(value), true) => Some(JsonValue::Array(
                self.apply_scalar(value).into_iter().collect(),
            )),
            (ParamValue::Many(values), true) => Some(JsonValue::Array(
                values.iter().filter_map(|v| self.apply_scalar(v)).collect(),
            )),
            (ParamValue::Many(_), false) => None,
        }
    }

    fn fallback(&self) -> Option<JsonValue> {
        match self.on_invalid {
            OnInvalid::UseDefault => self.default_value.clone(),
            OnInvalid::Omit => None,
        }
    }
}

/// Ordered mapping from parameter key to rule.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    rules: Vec<(String, FilterRule)>,
}

impl FilterSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule for `key`.
    pub fn rule(mut self, key: impl Into<String>, rule: FilterRule) -> Self {
        let key = key.into();
        match self.rules.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((key, rule)),
        }
        self
    }

    /// Rule for `key`.
    pub fn get(&self, key: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|(k, _)| k == key).map(|(_, rule)| rule)
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(k, _)| k.as_str())
    }

    /// Keys whose rule is marked required.
    pub fn required_keys(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|(_, rule)| rule.required)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the spec has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules for the six navigation keys.
    ///
    /// `rows` and `page` are integers of at least one defaulting to
    /// `rows_default` and the first page; `sod` must spell a direction and is
    /// dropped otherwise.
    pub fn navigation(rows_default: u64) -> Self {
        let rows_default = i64::try_from(rows_default.max(1)).unwrap_or(i64::MAX);
        Self::new()
            .rule(KEY_FILTER_COLUMN, FilterRule::text())
            .rule(KEY_FILTER_TEXT, FilterRule::text())
            .rule(KEY_SORT_COLUMN, FilterRule::text())
            .rule(
                KEY_SORT_DIRECTION,
                FilterRule::text()
                    .with_pattern(DIRECTION.clone())
                    .with_on_invalid(OnInvalid::Omit),
            )
            .rule(
                KEY_ROWS,
                FilterRule::integer().with_min(1).with_default_value(rows_default),
            )
            .rule(
                KEY_PAGE,
                FilterRule::integer()
                    .with_min(1)
                    .with_default_value(DEFAULT_PAGE as i64),
            )
    }
}

/// Validated values keyed by parameter name, in spec order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredParams {
    fields: Vec<(String, JsonValue)>,
}

impl FilteredParams {
    /// Validated value of `key`.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text value of `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    /// Integer value of `key`.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(JsonValue::as_i64)
    }

    /// Sequence value of `key`; a scalar is returned as a one-element list.
    pub fn get_list(&self, key: &str) -> Vec<JsonValue> {
        match self.get(key) {
            Some(JsonValue::Array(items)) => items.clone(),
            Some(value) => vec![value.clone()],
            None => Vec::new(),
        }
    }

    /// Whether `key` survived validation.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove and return the value of `key`.
    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        let index = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(index).1)
    }

    /// Iterate `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of surviving keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing survived.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for FilteredParams {
    type Item = (String, JsonValue);
    type IntoIter = std::vec::IntoIter<(String, JsonValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Result of a presence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyCheck {
    /// Every key carried a value
    Complete,
    /// First key found missing or blank
    Missing(String),
}

impl EmptyCheck {
    /// Whether every key carried a value.
    pub fn is_complete(&self) -> bool {
        matches!(self, EmptyCheck::Complete)
    }
}

/// Validates raw request parameters against a [`FilterSpec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterFilter;

impl ParameterFilter {
    /// Validate `raw` against `spec`.
    ///
    /// Only keys named by the spec appear in the result. An absent key takes
    /// its rule's default; an invalid one is handled per [`OnInvalid`].
    #[instrument(skip_all, fields(rules = spec.len()))]
    pub fn validate(raw: &impl RequestParams, spec: &FilterSpec) -> FilteredParams {
        let mut fields = Vec::with_capacity(spec.len());
        for (key, rule) in &spec.rules {
            let value = match raw.param(key) {
                Some(value) => rule.apply(value).or_else(|| {
                    debug!(key = %key, "Dropped invalid parameter");
                    rule.fallback()
                }),
                None => rule.default_value.clone(),
            };
            if let Some(value) = value {
                fields.push((key.clone(), value));
            }
        }
        FilteredParams { fields }
    }

    /// Report the first of `keys` that is absent or empty.
    ///
    /// An empty string and a literal `"0"` are empty; whitespace is not.
    pub fn empty_check<'a>(
        raw: &impl RequestParams,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> EmptyCheck {
        for key in keys {
            let blank = raw.param(key).is_none_or(ParamValue::is_empty);
            if blank {
                debug!(key, "Required parameter missing");
                return EmptyCheck::Missing(key.to_string());
            }
        }
        EmptyCheck::Complete
    }

    /// [`empty_check`](Self::empty_check) over the spec's required keys.
    pub fn check_required(raw: &impl RequestParams, spec: &FilterSpec) -> EmptyCheck {
        Self::empty_check(raw, spec.required_keys())
    }

    /// Validate the navigation keys and fold them into normalized form.
    ///
    /// Blank text values count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula_core::SortDirection;
    /// use tabula_database::ParameterFilter;
    /// use tabula_interface::RawParams;
    ///
    /// let raw = RawParams::parse("sst=name&sod=desc&rows=abc&page=0");
    /// let params = ParameterFilter::normalize(&raw, 20);
    /// assert_eq!(params.sort_direction(), Some(SortDirection::Desc));
    /// assert_eq!(params.page_size(), 20);
    /// assert_eq!(params.page_number(), 1);
    /// ```
    pub fn normalize(raw: &impl RequestParams, rows_default: u64) -> NormalizedQueryParams {
        let fields = Self::validate(raw, &FilterSpec::navigation(rows_default));
        let text = |key: &str| {
            fields
                .get_str(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let positive = |key: &str, default: u64| {
            fields
                .get_i64(key)
                .and_then(|v| u64::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        NormalizedQueryParams::new(
            text(KEY_FILTER_COLUMN),
            text(KEY_FILTER_TEXT),
            text(KEY_SORT_COLUMN),
            fields
                .get_str(KEY_SORT_DIRECTION)
                .and_then(|v| SortDirection::from_str(v).ok()),
            positive(KEY_ROWS, rows_default.max(1)),
            positive(KEY_PAGE, DEFAULT_PAGE),
        )
    }
}

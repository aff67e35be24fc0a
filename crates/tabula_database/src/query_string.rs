//! Navigation state on the wire.

use crate::ParameterFilter;
use tabula_core::NormalizedQueryParams;
use tabula_interface::RawParams;

/// Percent-encode a value for a query string (spaces become `+`).
pub fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Escape text for use in HTML content or a double-quoted attribute.
///
/// # Examples
///
/// ```
/// use tabula_database::escape_html;
///
/// assert_eq!(escape_html(r#"a&b "<c>""#), "a&amp;b &quot;&lt;c&gt;&quot;");
/// ```
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes and parses the navigation query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryString;

impl QueryString {
    /// Serialize as `&k=v` pairs in wire order, skipping empty values.
    ///
    /// Every pair carries a leading `&`, so the result can be appended to a
    /// URL that already has a query.
    ///
    /// # Examples
    ///
    /// ```
    /// use tabula_core::NormalizedQueryParams;
    /// use tabula_database::QueryString;
    ///
    /// let params = NormalizedQueryParams::builder()
    ///     .filter_column("title")
    ///     .filter_text("rust book")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(QueryString::serialize(&params), "&sfl=title&stx=rust+book&rows=20&page=1");
    /// ```
    pub fn serialize(params: &NormalizedQueryParams) -> String {
        params
            .pairs()
            .into_iter()
            .map(|(key, value)| format!("&{}={}", key, encode_component(&value)))
            .collect()
    }

    /// Parse a serialized query string back into normalized form.
    pub fn parse(query: &str, rows_default: u64) -> NormalizedQueryParams {
        ParameterFilter::normalize(&RawParams::parse(query), rows_default)
    }

    /// Hidden form inputs carrying the same pairs as [`serialize`](Self::serialize).
    pub fn hidden_fields(params: &NormalizedQueryParams) -> String {
        params
            .pairs()
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
                    key,
                    escape_html(&value)
                )
            })
            .collect()
    }
}

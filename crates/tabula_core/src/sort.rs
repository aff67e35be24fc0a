//! Sort direction.

use serde::{Deserialize, Serialize};

/// Direction of an `ORDER BY` clause.
///
/// Parsing is case-insensitive; rendering is always upper case, which is the
/// form written into query strings.
///
/// # Examples
///
/// ```
/// use tabula_core::SortDirection;
///
/// let dir: SortDirection = "desc".parse().unwrap();
/// assert_eq!(dir, SortDirection::Desc);
/// assert_eq!(dir.to_string(), "DESC");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum SortDirection {
    /// Ascending
    #[default]
    #[strum(serialize = "ASC")]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    /// Descending
    #[strum(serialize = "DESC")]
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    /// The other direction.
    pub fn opposite(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

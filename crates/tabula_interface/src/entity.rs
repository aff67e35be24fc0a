//! Table-bound entity declarations.

/// A Rust type bound to one database table.
///
/// The table name defaults to the type's own name, lower-cased, so
/// `crate::model::Member` maps to `member`. `ATTRIBUTES` is the allow-list of
/// columns that inserts and updates may write; request fields outside it are
/// dropped.
///
/// # Examples
///
/// ```
/// use tabula_interface::Entity;
///
/// struct Member;
///
/// impl Entity for Member {
///     const ATTRIBUTES: &'static [&'static str] = &["id", "name", "email"];
/// }
///
/// assert_eq!(Member::table_name(), "member");
/// assert_eq!(Member::heading(), "Member");
/// ```
pub trait Entity {
    /// Explicit table name, overriding the derived one.
    const TABLE: Option<&'static str> = None;

    /// Explicit heading, overriding the capitalized namespace.
    const HEADING: Option<&'static str> = None;

    /// Columns that inserts and updates may write.
    const ATTRIBUTES: &'static [&'static str];

    /// Lower-cased type name, used in redirect paths.
    fn namespace() -> String {
        derive_table_name(std::any::type_name::<Self>())
    }

    /// Table the entity is bound to.
    fn table_name() -> String {
        Self::TABLE
            .map(str::to_string)
            .unwrap_or_else(Self::namespace)
    }

    /// Human-readable heading for list and row pages.
    fn heading() -> String {
        if let Some(heading) = Self::HEADING {
            return heading.to_string();
        }
        let namespace = Self::namespace();
        let mut chars = namespace.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Derive a table name from a fully qualified type name.
///
/// Generic arguments and the module path are dropped and the remainder is
/// lower-cased.
pub fn derive_table_name(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Member;

    impl Entity for Member {
        const ATTRIBUTES: &'static [&'static str] = &["id", "name"];
    }

    struct LegacyOrder;

    impl Entity for LegacyOrder {
        const TABLE: Option<&'static str> = Some("tbl_orders");
        const HEADING: Option<&'static str> = Some("Orders");
        const ATTRIBUTES: &'static [&'static str] = &["id"];
    }

    #[test]
    fn test_derive_table_name() {
        assert_eq!(derive_table_name("app::model::BlogPost"), "blogpost");
        assert_eq!(derive_table_name("Member"), "member");
        assert_eq!(derive_table_name("app::Wrapper<app::Inner>"), "wrapper");
    }

    #[test]
    fn test_default_bindings() {
        assert_eq!(Member::namespace(), "member");
        assert_eq!(Member::table_name(), "member");
        assert_eq!(Member::heading(), "Member");
    }

    #[test]
    fn test_overrides() {
        assert_eq!(LegacyOrder::table_name(), "tbl_orders");
        assert_eq!(LegacyOrder::namespace(), "legacyorder");
        assert_eq!(LegacyOrder::heading(), "Orders");
    }
}

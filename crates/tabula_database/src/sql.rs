//! SQL text helpers.
//!
//! Statements are assembled with `?` placeholders and renumbered for
//! PostgreSQL just before execution. Only fragment text supplied by the
//! embedding code is interpolated; every request value travels as a bound
//! parameter.

use tabula_core::Dialect;
use tabula_error::{QueryError, QueryErrorKind, QueryOperation};

/// Whether `name` is a plain, optionally qualified SQL identifier.
///
/// Each dot-separated segment must start with an ASCII letter or underscore
/// and continue with ASCII letters, digits or underscores.
///
/// # Examples
///
/// ```
/// use tabula_database::is_identifier;
///
/// assert!(is_identifier("created_at"));
/// assert!(is_identifier("shop.member"));
/// assert!(!is_identifier("name; DROP TABLE member"));
/// assert!(!is_identifier("1st"));
/// ```
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_segment)
}

fn is_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Refuse a runtime identifier that is not a plain column name.
#[track_caller]
pub(crate) fn ensure_identifier(operation: QueryOperation, name: &str) -> Result<(), QueryError> {
    if is_identifier(name) {
        Ok(())
    } else {
        tracing::error!(%operation, identifier = name, "Refusing unsafe identifier");
        Err(QueryError::new(
            operation,
            QueryErrorKind::InvalidIdentifier(name.to_string()),
        ))
    }
}

/// Replace `?` placeholders with `$1`, `$2`, ... in order of appearance.
///
/// Question marks inside single- or double-quoted sections are left alone.
///
/// # Examples
///
/// ```
/// use tabula_database::number_placeholders;
///
/// let sql = number_placeholders("SELECT * FROM t WHERE a = ? AND b = '?' AND c = ?");
/// assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b = '?' AND c = $2");
/// ```
pub fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut index = 0;
    let mut in_single = false;
    let mut in_double = false;
    for c in sql.chars() {
        match c {
            '\'' if !in_double => {
                in_single = !in_single;
                out.push(c);
            }
            '"' if !in_single => {
                in_double = !in_double;
                out.push(c);
            }
            '?' if !in_single && !in_double => {
                index += 1;
                out.push('$');
                out.push_str(&index.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}

/// Render statement text for the dialect's placeholder style.
pub fn render(dialect: Dialect, sql: &str) -> String {
    match dialect {
        Dialect::MySql => sql.to_string(),
        Dialect::Postgres => number_placeholders(sql),
    }
}

/// Escape `LIKE` metacharacters so a needle matches literally.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// PostgreSQL type a text-bound value must be cast to for a column of
/// catalog type `data_type`.
///
/// Text-like and integer types need no cast and yield `None`, as do types
/// that cannot be named safely (`USER-DEFINED`, `ARRAY`).
pub(crate) fn pg_cast(data_type: &str) -> Option<&'static str> {
    let cast = match data_type.trim().to_ascii_lowercase().as_str() {
        "date" => "date",
        "timestamp" | "timestamp without time zone" => "timestamp",
        "timestamptz" | "timestamp with time zone" => "timestamptz",
        "time" | "time without time zone" => "time",
        "timetz" | "time with time zone" => "timetz",
        "interval" => "interval",
        "bool" | "boolean" => "boolean",
        "numeric" | "decimal" => "numeric",
        "real" => "real",
        "double precision" => "double precision",
        "uuid" => "uuid",
        "json" => "json",
        "jsonb" => "jsonb",
        "inet" => "inet",
        _ => return None,
    };
    Some(cast)
}

/// Comma-separated list of `count` placeholders.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("_hidden"));
        assert!(is_identifier("member2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a.b."));
        assert!(!is_identifier("name desc"));
        assert!(!is_identifier("x`y"));
    }

    #[test]
    fn test_ensure_identifier_reports_operation() {
        let err = ensure_identifier(QueryOperation::Delete, "id OR 1=1").unwrap_err();
        assert_eq!(err.operation, QueryOperation::Delete);
        assert!(matches!(err.kind, QueryErrorKind::InvalidIdentifier(ref name) if name == "id OR 1=1"));
    }

    #[test]
    fn test_number_placeholders_skips_double_quoted() {
        assert_eq!(
            number_placeholders(r#"SELECT "a?" FROM t WHERE x IN (?, ?)"#),
            r#"SELECT "a?" FROM t WHERE x IN ($1, $2)"#
        );
    }

    #[test]
    fn test_number_placeholders_handles_escaped_quote() {
        assert_eq!(
            number_placeholders("SELECT 'it''s?' WHERE a = ?"),
            "SELECT 'it''s?' WHERE a = $1"
        );
    }

    #[test]
    fn test_render_mysql_is_identity() {
        assert_eq!(render(Dialect::MySql, "a = ?"), "a = ?");
        assert_eq!(render(Dialect::Postgres, "a = ?"), "a = $1");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_pg_cast() {
        assert_eq!(pg_cast("date"), Some("date"));
        assert_eq!(pg_cast("timestamp with time zone"), Some("timestamptz"));
        assert_eq!(pg_cast("BOOLEAN"), Some("boolean"));
        assert_eq!(pg_cast("character varying"), None);
        assert_eq!(pg_cast("integer"), None);
        assert_eq!(pg_cast("USER-DEFINED"), None);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(0), "");
    }
}

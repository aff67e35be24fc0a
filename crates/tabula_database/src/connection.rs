//! PostgreSQL connections and the diesel-backed statement executor.

use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text};
use serde_json::Value as JsonValue;
use std::ops::DerefMut;
use tabula_core::{ExecOutcome, Row};
use tabula_error::ExecutionError;
use tabula_interface::StatementExecutor;
use tracing::{debug, error, instrument};

/// Pool of PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Connection checked out of a [`PgPool`].
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

fn database_url() -> Result<String, ExecutionError> {
    std::env::var("DATABASE_URL").map_err(|_| {
        error!("DATABASE_URL environment variable not set");
        ExecutionError::new("DATABASE_URL environment variable not set")
    })
}

/// Establish a connection to the PostgreSQL database.
///
/// Reads the `DATABASE_URL` environment variable to determine the connection string.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
#[instrument(name = "database.establish_connection")]
pub fn establish_connection() -> Result<PgConnection, ExecutionError> {
    let database_url = database_url()?;
    debug!("Connecting to PostgreSQL database");
    PgConnection::establish(&database_url).map_err(|e| {
        error!(error = %e, "Failed to establish database connection");
        ExecutionError::from(e)
    })
}

/// Create a connection pool for the PostgreSQL database.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is not set or the pool cannot be built.
#[instrument(name = "database.create_pool")]
pub fn create_pool() -> Result<PgPool, ExecutionError> {
    create_pool_from_url(&database_url()?)
}

/// Create a connection pool for an explicit connection string.
///
/// # Errors
///
/// Returns an error if the pool cannot be built.
#[instrument(name = "database.create_pool_from_url", skip(database_url))]
pub fn create_pool_from_url(database_url: &str) -> Result<PgPool, ExecutionError> {
    debug!("Creating PostgreSQL connection pool");
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(10).build(manager).map_err(|e| {
        error!(error = %e, "Failed to create connection pool");
        ExecutionError::new(format!("connection pool: {}", e))
    })
}

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    row_to_json: String,
}

/// [`StatementExecutor`] over a PostgreSQL connection.
///
/// Row-returning statements are wrapped so every row comes back as one
/// `row_to_json` text value, which keeps the executor independent of the
/// table's column types.
///
/// Works with a plain `&mut PgConnection` or a pooled connection.
pub struct PgExecutor<C> {
    conn: C,
}

impl<C> PgExecutor<C>
where
    C: DerefMut<Target = PgConnection>,
{
    /// Executor running statements on `conn`.
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

impl PgExecutor<PgPooledConnection> {
    /// Executor on a connection checked out of `pool`.
    pub fn from_pool(pool: &PgPool) -> Result<Self, ExecutionError> {
        let conn = pool.get().map_err(|e| {
            error!(error = %e, "Failed to get connection from pool");
            ExecutionError::new(format!("connection pool exhausted: {}", e))
        })?;
        Ok(Self::new(conn))
    }
}

impl<C> std::fmt::Debug for PgExecutor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgExecutor").finish_non_exhaustive()
    }
}

fn bind_all<'a>(
    mut query: BoxedSqlQuery<'a, Pg, SqlQuery>,
    params: &[JsonValue],
) -> BoxedSqlQuery<'a, Pg, SqlQuery> {
    for value in params {
        query = match value {
            JsonValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
            JsonValue::Bool(b) => query.bind::<Bool, _>(*b),
            JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => query.bind::<BigInt, _>(i),
                (None, Some(f)) => query.bind::<Double, _>(f),
                (None, None) => query.bind::<Text, _>(n.to_string()),
            },
            JsonValue::String(s) => query.bind::<Text, _>(s.clone()),
            other => query.bind::<Text, _>(other.to_string()),
        };
    }
    query
}

/// How a statement's output is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Select,
    Returning,
    Command,
}

fn shape(sql: &str) -> Shape {
    let upper = sql.trim_start().to_ascii_uppercase();
    if upper.starts_with("SELECT") || upper.starts_with("WITH") {
        Shape::Select
    } else if upper.contains(" RETURNING ") {
        Shape::Returning
    } else {
        Shape::Command
    }
}

fn wrap(sql: &str, shape: Shape) -> String {
    match shape {
        Shape::Select => format!(
            "SELECT row_to_json(tabula_rows)::text AS row_to_json FROM ({}) tabula_rows",
            sql
        ),
        Shape::Returning => format!(
            "WITH tabula_rows AS ({}) SELECT row_to_json(tabula_rows)::text AS row_to_json FROM tabula_rows",
            sql
        ),
        Shape::Command => sql.to_string(),
    }
}

impl<C> StatementExecutor for PgExecutor<C>
where
    C: DerefMut<Target = PgConnection>,
{
    fn execute(&mut self, sql: &str, params: &[JsonValue]) -> Result<ExecOutcome, ExecutionError> {
        let shape = shape(sql);
        let statement = wrap(sql, shape);
        let query = bind_all(diesel::sql_query(statement).into_boxed::<Pg>(), params);
        let conn: &mut PgConnection = &mut self.conn;

        if shape == Shape::Command {
            let affected = query.execute(conn)?;
            return Ok(ExecOutcome::default().with_rows_affected(affected as u64));
        }

        let rows = query
            .load::<JsonRow>(conn)?
            .into_iter()
            .map(|row| serde_json::from_str::<Row>(&row.row_to_json))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!(error = %e, "Failed to decode row_to_json output");
                ExecutionError::new(format!("row decode failed: {}", e))
            })?;
        Ok(ExecOutcome::from_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_detection() {
        assert_eq!(shape("SELECT * FROM t"), Shape::Select);
        assert_eq!(shape("  select 1"), Shape::Select);
        assert_eq!(
            shape("INSERT INTO t (a) VALUES ($1) RETURNING id"),
            Shape::Returning
        );
        assert_eq!(shape("DELETE FROM t WHERE id IN ($1)"), Shape::Command);
    }

    #[test]
    fn test_wrap_returning_uses_cte() {
        assert_eq!(
            wrap("INSERT INTO t DEFAULT VALUES RETURNING id", Shape::Returning),
            "WITH tabula_rows AS (INSERT INTO t DEFAULT VALUES RETURNING id) SELECT row_to_json(tabula_rows)::text AS row_to_json FROM tabula_rows"
        );
    }
}

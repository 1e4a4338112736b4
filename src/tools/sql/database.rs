use std::{fmt::Write, str::FromStr};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Column, Row, TypeInfo, ValueRef,
};

use crate::tools::ToolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

/// Column names plus rendered rows of a finished query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "Query executed successfully. No rows returned.".to_string();
        }

        let mut out = format!(
            "Columns: {}\nReturned {} row(s):",
            self.columns.join(", "),
            self.rows.len()
        );
        for (i, row) in self.rows.iter().enumerate() {
            let _ = write!(out, "\n  {}. ({})", i + 1, row.join(", "));
        }
        out
    }
}

/// Handle to a SQLite database. Cloning shares the underlying pool.
#[derive(Clone, Debug)]
pub struct SqlDatabase {
    pool: SqlitePool,
}

impl SqlDatabase {
    /// Opens `url` (e.g. `sqlite://sample.db`) read-only. Writes are refused by
    /// the engine regardless of what passes statement validation.
    pub async fn connect(url: &str) -> Result<Self, ToolError> {
        let options = SqliteConnectOptions::from_str(url)?
            .read_only(true)
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        log::debug!("Opened read-only database at {url}");
        Ok(Self { pool })
    }

    /// Wraps an existing pool. The caller is responsible for it being read-only.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn table_names(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// The stored name of `table_name`, matched case-insensitively the way
    /// SQLite resolves identifiers. `None` when no such table exists.
    pub async fn resolve_table(&self, table_name: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        )
        .bind(table_name)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn columns(&self, table_name: &str) -> Result<Vec<ColumnInfo>, sqlx::Error> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
                .bind(table_name)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(name, declared_type)| ColumnInfo {
                name,
                declared_type,
            })
            .collect())
    }

    /// Callers must have resolved the name with [`SqlDatabase::resolve_table`] first; the name
    /// is quoted but not otherwise validated.
    pub async fn row_count(&self, table_name: &str) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name));
        sqlx::query_scalar(&sql).fetch_one(&self.pool).await
    }

    /// Runs `sql` as-is and renders every value to text.
    pub async fn fetch(&self, sql: &str) -> Result<QueryRows, sqlx::Error> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| render_value(row, i))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryRows { columns, rows })
    }
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn render_value(row: &SqliteRow, index: usize) -> Result<String, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok("NULL".to_string());
    }
    let type_name = raw.type_info().name().to_string();

    let rendered = match type_name.as_str() {
        "INTEGER" | "BIGINT" | "BOOLEAN" => row.try_get_unchecked::<i64, _>(index)?.to_string(),
        "REAL" | "NUMERIC" => row.try_get_unchecked::<f64, _>(index)?.to_string(),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            format!("<{} bytes>", bytes.len())
        }
        _ => format!(
            "'{}'",
            row.try_get_unchecked::<String, _>(index)?
                .replace('\'', "''")
        ),
    };
    Ok(rendered)
}

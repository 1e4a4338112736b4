use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, Connection};
use tempfile::TempDir;

use super::SqlDatabase;

const FIXTURE: &[&str] = &[
    "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT)",
    "INSERT INTO customers (id, name, email) VALUES
        (1, 'Ada Lovelace', 'ada@example.com'),
        (2, 'Alan Turing', 'alan@example.com'),
        (3, 'Grace Hopper', 'grace@example.com'),
        (4, 'Barbara Liskov', 'barbara@example.com'),
        (5, 'Edsger Dijkstra', NULL)",
    "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, amount REAL NOT NULL)",
    "INSERT INTO orders (id, customer_id, amount) VALUES (1, 1, 120.5), (2, 1, 30.0), (3, 3, 99.5)",
];

/// Writes the fixture to a temporary file and reopens it read-only.
/// Keep the returned directory alive for as long as the database is used.
pub(crate) async fn fixture_database() -> (TempDir, SqlDatabase) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.db");

    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    for statement in FIXTURE {
        sqlx::query(statement).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();

    let db = SqlDatabase::connect(&format!("sqlite://{}", path.display()))
        .await
        .unwrap();
    (dir, db)
}

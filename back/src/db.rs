use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool,
};
use tasks_api::v1::{NewTodo, Todo, TodoFilter};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS todo (
    id INTEGER NOT NULL PRIMARY KEY,
    title VARCHAR NOT NULL,
    description VARCHAR,
    is_completed BOOLEAN NOT NULL DEFAULT 0,
    deadline DATETIME,
    category VARCHAR NOT NULL DEFAULT 'Life',
    priority INTEGER NOT NULL DEFAULT 4
);
CREATE INDEX IF NOT EXISTS ix_todo_title ON todo (title);
"#;

const SELECT_TODO: &str =
    "SELECT id, title, description, is_completed, deadline, category, priority FROM todo";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("todo {id} not found")]
    NotFound { id: i64 },
}

#[derive(FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: Option<String>,
    is_completed: bool,
    deadline: Option<DateTime<Utc>>,
    category: String,
    priority: i64,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            is_completed: row.is_completed,
            deadline: row.deadline,
            category: row.category,
            priority: row.priority,
        }
    }
}

pub async fn connect(path: &Path, max_connections: u32) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates the table and its index if they don't exist yet.
///
/// Existing tables are left alone, columns added since they were created
/// are not back-filled.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

/// Opens a session for one unit of work.
///
/// The connection returns to the pool when the session is dropped, whichever
/// way the handler exits.
pub async fn session(pool: &SqlitePool) -> Result<PoolConnection<Sqlite>, DbError> {
    Ok(pool.acquire().await?)
}

pub async fn list(conn: &mut SqliteConnection, filter: TodoFilter) -> Result<Vec<Todo>, DbError> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_TODO);

    if let Some(completed) = filter.completed {
        query.push(" WHERE is_completed = ").push_bind(completed);
    }

    let rows = query
        .build_query_as::<TodoRow>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(Todo::from).collect())
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Todo, DbError> {
    let row = sqlx::query_as::<_, TodoRow>(&format!("{SELECT_TODO} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(DbError::NotFound { id })?;

    Ok(Todo::from(row))
}

/// Inserts a todo and reads it back with its assigned id.
pub async fn insert(conn: &mut SqliteConnection, todo: NewTodo) -> Result<Todo, DbError> {
    let id = sqlx::query(
        r#"
        INSERT INTO todo (title, description, is_completed, deadline, category, priority)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&todo.title)
    .bind(&todo.description)
    .bind(todo.is_completed)
    .bind(todo.deadline)
    .bind(&todo.category)
    .bind(todo.priority)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    get(conn, id).await
}

/// Writes every column of `todo` over the row with the same id.
pub async fn update(conn: &mut SqliteConnection, todo: &Todo) -> Result<Todo, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE todo
        SET title = ?, description = ?, is_completed = ?, deadline = ?, category = ?, priority = ?
        WHERE id = ?
        "#,
    )
    .bind(&todo.title)
    .bind(&todo.description)
    .bind(todo.is_completed)
    .bind(todo.deadline)
    .bind(&todo.category)
    .bind(todo.priority)
    .bind(todo.id)
    .execute(&mut *conn)
    .await?;

    // the row can vanish between read and write
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound { id: todo.id });
    }

    get(conn, todo.id).await
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM todo WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound { id });
    }

    Ok(())
}

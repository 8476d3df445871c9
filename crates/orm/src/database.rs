//! SQLite access through an sqlx pool.

use crate::error::{OrmError, Result};
use crate::sql;
use crate::table::{Table, Value};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const SELECT_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name;";

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database file at `path`, creating it when missing
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path.as_ref()).create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;
        debug!(path = %path.as_ref().display(), "database opened");
        Ok(Self { pool })
    }

    /// A private in-memory database that lives as long as this value
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // every connection would see its own empty database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Names of the user tables, sorted
    pub async fn tables(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar::<_, String>(SELECT_TABLES_SQL).fetch_all(&self.pool).await?)
    }

    pub async fn create<T: Table>(&self) -> Result<()> {
        let sql = sql::create_table::<T>();
        debug!(%sql, "create table");
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts a new record and stores its id, or updates the row of a saved one
    pub async fn save<T: Table>(&self, record: &mut T) -> Result<()> {
        match record.id() {
            None => {
                let (sql, params) = sql::insert(record);
                debug!(%sql, ?params, "insert");
                let result = bind_all(sqlx::query(&sql), params).execute(&self.pool).await?;
                record.set_id(result.last_insert_rowid());
            }
            Some(id) => {
                let (sql, params) = sql::update(record, id);
                debug!(%sql, ?params, "update");
                bind_all(sqlx::query(&sql), params).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    pub async fn get<T: Table>(&self, id: i64) -> Result<Option<T>> {
        let sql = sql::select_by_id::<T>();
        debug!(%sql, id, "select one");
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    pub async fn all<T: Table>(&self) -> Result<Vec<T>> {
        let sql = sql::select_all::<T>();
        debug!(%sql, "select all");
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    /// Deletes the row of a saved record; fails with [`OrmError::Unsaved`] otherwise
    pub async fn delete<T: Table>(&self, record: &T) -> Result<()> {
        let id = record.id().ok_or_else(|| OrmError::Unsaved { table: T::table_name() })?;
        let sql = sql::delete::<T>();
        debug!(%sql, id, "delete");
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_all<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: Vec<Value>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    params.into_iter().fold(query, |query, value| match value {
        Value::Null => query.bind(None::<i64>),
        Value::Integer(value) => query.bind(value),
        Value::Real(value) => query.bind(value),
        Value::Text(value) => query.bind(value),
        Value::Blob(value) => query.bind(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tests::{Author, Book};

    #[tokio::test]
    async fn new_database_has_no_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(dir.path().join("test.db")).await.unwrap();

        assert!(db.tables().await.unwrap().is_empty());
        assert!(dir.path().join("test.db").exists());
    }

    #[tokio::test]
    async fn create_tables() {
        let db = Database::in_memory().await.unwrap();

        db.create::<Author>().await.unwrap();
        db.create::<Book>().await.unwrap();
        // creating twice is harmless
        db.create::<Author>().await.unwrap();

        assert_eq!(db.tables().await.unwrap(), ["author", "book"]);
    }

    #[tokio::test]
    async fn save_assigns_increasing_ids() {
        let db = Database::in_memory().await.unwrap();
        db.create::<Author>().await.unwrap();

        let mut zhang_san = Author::new("Zhang San", 23);
        db.save(&mut zhang_san).await.unwrap();
        assert_eq!(zhang_san.id, Some(1));

        let mut li_si = Author::new("Li Si", 18);
        db.save(&mut li_si).await.unwrap();
        assert_eq!(li_si.id, Some(2));

        let mut wang_wu = Author::new("Wang Wu", 39);
        db.save(&mut wang_wu).await.unwrap();
        assert_eq!(wang_wu.id, Some(3));
    }

    #[tokio::test]
    async fn get_all_update_and_delete() {
        let db = Database::in_memory().await.unwrap();
        db.create::<Author>().await.unwrap();
        db.create::<Book>().await.unwrap();

        let mut author = Author::new("Zhang San", 23);
        db.save(&mut author).await.unwrap();
        let mut book = Book { id: None, title: "Rust".to_owned(), published: false, author_id: author.id.unwrap() };
        db.save(&mut book).await.unwrap();

        assert_eq!(db.get::<Author>(1).await.unwrap(), Some(author.clone()));
        assert_eq!(db.get::<Author>(42).await.unwrap(), None);

        book.published = true;
        db.save(&mut book).await.unwrap();
        assert_eq!(book.id, Some(1));
        assert_eq!(db.all::<Book>().await.unwrap(), vec![book.clone()]);

        db.delete(&book).await.unwrap();
        assert!(db.all::<Book>().await.unwrap().is_empty());

        let unsaved = Author::new("Li Si", 18);
        assert!(matches!(db.delete(&unsaved).await, Err(OrmError::Unsaved { .. })));
    }
}

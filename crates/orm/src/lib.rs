//! A tiny active-record style ORM over a single SQLite file.
//!
//! Record types implement [`Table`]; [`Database`] creates their tables and saves,
//! loads and deletes them with plain parameterized SQL. There are no migrations and
//! every statement runs in its own implicit transaction.

mod database;
mod error;
mod table;

pub mod sql;

pub use database::Database;
pub use error::{OrmError, Result};
pub use table::{Field, FieldKind, SqlType, SqlTyped, Table, Value};

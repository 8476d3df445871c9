//! Describing a record type as a table.

use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

/// SQLite storage classes a column can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Blob,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rust types with a fixed column type
pub trait SqlTyped {
    const SQL_TYPE: SqlType;
}

macro_rules! sql_typed {
    ($sql_type:ident: $($ty:ty),+) => {
        $(
            impl SqlTyped for $ty {
                const SQL_TYPE: SqlType = SqlType::$sql_type;
            }
        )+
    };
}

sql_typed!(Integer: i8, i16, i32, i64, u8, u16, u32, bool);
sql_typed!(Real: f32, f64);
sql_typed!(Text: String, &str);
sql_typed!(Blob: Vec<u8>, &[u8]);

impl<T: SqlTyped> SqlTyped for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Column(SqlType),
    /// stored as `<name>_id INTEGER`, referencing the `id` of `table`
    ForeignKey { table: String },
}

/// One declared attribute of a [`Table`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: &'static str,
    kind: FieldKind,
}

impl Field {
    pub fn column<T: SqlTyped>(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Column(T::SQL_TYPE) }
    }

    pub fn foreign_key<T: Table>(name: &'static str) -> Self {
        Self { name, kind: FieldKind::ForeignKey { table: T::table_name() } }
    }

    /// The declared attribute name
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The column actually stored: the name itself, or `<name>_id` for a foreign key
    pub fn column_name(&self) -> Cow<'static, str> {
        match self.kind {
            FieldKind::Column(_) => Cow::Borrowed(self.name),
            FieldKind::ForeignKey { .. } => Cow::Owned(format!("{}_id", self.name)),
        }
    }

    pub fn sql_type(&self) -> SqlType {
        match self.kind {
            FieldKind::Column(sql_type) => sql_type,
            FieldKind::ForeignKey { .. } => SqlType::Integer,
        }
    }

    /// Column definition as it appears in `CREATE TABLE`
    pub fn definition(&self) -> String {
        format!("{} {}", self.column_name(), self.sql_type())
    }
}

/// A value bound to a statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )+
    };
}

value_from!(Integer: i8, i16, i32, i64, u8, u16, u32);
value_from!(Real: f32, f64);
value_from!(Text: String, &str);
value_from!(Blob: Vec<u8>, &[u8]);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A record type stored in its own table.
///
/// Every table has an `id INTEGER PRIMARY KEY AUTOINCREMENT` column, which is `None`
/// until the record is saved.
///
/// # Example
/// ```
/// use sixi_orm::{Field, Table, Value};
///
/// #[derive(sqlx::FromRow)]
/// struct Author {
///     id: Option<i64>,
///     name: String,
///     age: i64,
/// }
///
/// impl Table for Author {
///     fn fields() -> Vec<Field> {
///         vec![Field::column::<String>("name"), Field::column::<i64>("age")]
///     }
///
///     fn id(&self) -> Option<i64> {
///         self.id
///     }
///
///     fn set_id(&mut self, id: i64) {
///         self.id = Some(id);
///     }
///
///     fn values(&self) -> Vec<(&'static str, Value)> {
///         vec![("name", self.name.as_str().into()), ("age", self.age.into())]
///     }
/// }
///
/// assert_eq!(Author::table_name(), "author");
/// ```
pub trait Table: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    /// Lower-cased type name unless overridden
    fn table_name() -> String {
        let path = type_name::<Self>();
        path.rsplit("::").next().unwrap_or(path).to_lowercase()
    }

    /// The declared attributes, in any order
    fn fields() -> Vec<Field>;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Current values keyed by field name; foreign keys carry the referenced id
    fn values(&self) -> Vec<(&'static str, Value)>;
}

/// Fields ordered by name, the column order of every generated statement
pub(crate) fn sorted_fields<T: Table>() -> Vec<Field> {
    let mut fields = T::fields();
    fields.sort_by_key(Field::name);
    fields
}

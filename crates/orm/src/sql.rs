//! Statement text for a [`Table`], with parameters in column order.

use crate::table::{sorted_fields, Field, Table, Value};

pub fn create_table<T: Table>() -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_owned()];
    columns.extend(sorted_fields::<T>().iter().map(Field::definition));
    format!("CREATE TABLE IF NOT EXISTS {} ({});", T::table_name(), columns.join(", "))
}

pub fn insert<T: Table>(record: &T) -> (String, Vec<Value>) {
    let (columns, params) = columns_and_params(record);
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!("INSERT INTO {} ({}) VALUES ({placeholders});", T::table_name(), columns.join(", "));
    (sql, params)
}

/// The row id is the last parameter
pub fn update<T: Table>(record: &T, id: i64) -> (String, Vec<Value>) {
    let (columns, mut params) = columns_and_params(record);
    let assignments = columns.iter().map(|column| format!("{column} = ?")).collect::<Vec<_>>().join(", ");
    params.push(Value::Integer(id));
    (format!("UPDATE {} SET {assignments} WHERE id = ?;", T::table_name()), params)
}

pub fn select_all<T: Table>() -> String {
    format!("SELECT {} FROM {} ORDER BY id;", select_columns::<T>(), T::table_name())
}

pub fn select_by_id<T: Table>() -> String {
    format!("SELECT {} FROM {} WHERE id = ?;", select_columns::<T>(), T::table_name())
}

pub fn delete<T: Table>() -> String {
    format!("DELETE FROM {} WHERE id = ?;", T::table_name())
}

fn select_columns<T: Table>() -> String {
    let mut columns = vec!["id".to_owned()];
    columns.extend(sorted_fields::<T>().iter().map(|field| field.column_name().into_owned()));
    columns.join(", ")
}

fn columns_and_params<T: Table>(record: &T) -> (Vec<String>, Vec<Value>) {
    let mut values = record.values();
    sorted_fields::<T>()
        .iter()
        .map(|field| {
            let value = values
                .iter()
                .position(|(name, _)| *name == field.name())
                .map_or(Value::Null, |index| values.swap_remove(index).1);
            (field.column_name().into_owned(), value)
        })
        .unzip()
}

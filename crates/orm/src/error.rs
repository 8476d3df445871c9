use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("`{table}` row has no id, save it first")]
    Unsaved { table: String },
}

pub type Result<T, E = OrmError> = std::result::Result<T, E>;

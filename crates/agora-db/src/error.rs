use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE or PRIMARY KEY constraint rejected the write.
    #[error("Constraint conflict: {0}")]
    Conflict(String),

    /// A FOREIGN KEY constraint rejected the write: the referenced row is gone.
    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("DB lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            let unique = matches!(
                failure.extended_code,
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            );
            if failure.code == ErrorCode::ConstraintViolation {
                if unique {
                    return Self::Conflict(message.clone().unwrap_or_default());
                }
                if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    return Self::MissingReference(message.clone().unwrap_or_default());
                }
            }
        }
        Self::Sqlite(err)
    }
}

impl DbError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_missing_reference(&self) -> bool {
        matches!(self, Self::MissingReference(_))
    }
}

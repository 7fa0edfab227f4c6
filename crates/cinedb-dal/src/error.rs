use std::fmt;

use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

const UNIQUE_VIOLATION: &str = "23505";
const INTEGRITY_CONSTRAINT_CLASS: &str = "23";

/// Store-agnostic classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    ConstraintViolation,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::ConstraintViolation => "constraint violation",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record already exists: {detail}")]
    AlreadyExists {
        detail: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Constraint violation: {detail}")]
    ConstraintViolation {
        detail: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] garde::Report),

    #[error("Database error: {0}")]
    DatabaseError(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Failed to link {} genre(s) to movie {movie_id}: {}", .failures.len(), join_failures(.failures))]
    GenreLinks { movie_id: Uuid, failures: Vec<Error> },
}

fn join_failures(failures: &[Error]) -> String {
    failures
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RecordNotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::ConstraintViolation { .. } | Error::InvalidInput(_) => {
                ErrorKind::ConstraintViolation
            }
            // first failure to complete decides
            Error::GenreLinks { failures, .. } => failures
                .first()
                .map(Error::kind)
                .unwrap_or(ErrorKind::Unknown),
            Error::DatabaseError(_)
            | Error::MigrationError(_)
            | Error::Cancelled
            | Error::TaskFailed(_) => ErrorKind::Unknown,
        }
    }

    pub fn not_found(entity: &str, id: Uuid) -> Self {
        Error::RecordNotFound(format!("{entity} {id}"))
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        translate(value)
    }
}

/// Classifies a raw store error by its SQLSTATE code. Message text is kept
/// only as detail.
pub fn translate(err: sqlx::Error) -> Error {
    match classify(&err) {
        ErrorKind::NotFound => Error::RecordNotFound("no rows returned".to_string()),
        ErrorKind::AlreadyExists => Error::AlreadyExists {
            detail: detail(&err),
            source: err,
        },
        ErrorKind::ConstraintViolation => Error::ConstraintViolation {
            detail: detail(&err),
            source: err,
        },
        ErrorKind::Unknown => Error::DatabaseError(err),
    }
}

pub fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Database(db_err) => classify_code(db_err.code().as_deref()),
        _ => ErrorKind::Unknown,
    }
}

pub fn classify_code(code: Option<&str>) -> ErrorKind {
    match code {
        Some(UNIQUE_VIOLATION) => ErrorKind::AlreadyExists,
        Some(code) if code.len() == 5 && code.starts_with(INTEGRITY_CONSTRAINT_CLASS) => {
            ErrorKind::ConstraintViolation
        }
        _ => ErrorKind::Unknown,
    }
}

fn detail(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => match db_err.constraint() {
            Some(constraint) => format!("{} (constraint {constraint})", db_err.message()),
            None => db_err.message().to_string(),
        },
        other => other.to_string(),
    }
}

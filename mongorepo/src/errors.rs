use backtrace::Backtrace;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for repository operations
///
/// Each kind describes a category of failure so callers can branch on it without
/// parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use mongorepo::errors::{RepositoryError, ErrorKind, RepositoryResult};
///
/// fn example() -> RepositoryResult<()> {
///     Err(RepositoryError::new("Entity has no id", ErrorKind::InvalidArgument))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// An argument was missing or malformed (e.g. updating an entity without an id)
    InvalidArgument,
    /// An identifier could not be converted to its stored representation
    InvalidId,
    /// A scalar lookup matched nothing
    NotFound,
    /// A scalar lookup matched more than one entity
    NotUnique,
    /// An entity with the same identifier already exists
    DuplicateKey,
    /// The predicate cannot be translated for the selected backend
    UnsupportedPredicate,
    /// Error during filter evaluation or construction
    FilterError,
    /// Error mapping an entity to/from a document
    ObjectMappingError,
    /// Invalid or incomplete repository configuration
    ConfigurationError,
    /// Error raised by the storage backend
    BackendError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::NotUnique => write!(f, "Not unique"),
            ErrorKind::DuplicateKey => write!(f, "Duplicate key"),
            ErrorKind::UnsupportedPredicate => write!(f, "Unsupported predicate"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for every fallible repository operation.
///
/// `RepositoryError` carries a message, a kind, an optional cause and the backtrace
/// captured where it was created. Errors coming from the MongoDB driver are kept as the
/// cause, so `source()` returns the driver error untouched.
///
/// # Examples
///
/// ```rust,ignore
/// use mongorepo::errors::{RepositoryError, ErrorKind};
///
/// let err = RepositoryError::new("Entity not found", ErrorKind::NotFound);
///
/// let cause = RepositoryError::new("connection refused", ErrorKind::BackendError);
/// let err = RepositoryError::new_with_cause("Count failed", ErrorKind::BackendError, cause);
/// ```
#[derive(Clone)]
pub struct RepositoryError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Arc<dyn Error + Send + Sync + 'static>>,
    backtrace: Arc<Mutex<Backtrace>>,
}

impl RepositoryError {
    /// Creates a new `RepositoryError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RepositoryError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    /// Creates a new `RepositoryError` wrapping an underlying error.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error, returned unchanged by `source()`
    pub fn new_with_cause<E>(message: &str, error_kind: ErrorKind, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        RepositoryError {
            message: message.to_string(),
            error_kind,
            cause: Some(Arc::new(cause)),
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl Display for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{} ({})\nCaused by: {:?}", self.message, self.error_kind, cause),
            None => {
                let mut backtrace = self.backtrace.lock();
                backtrace.resolve();
                write!(f, "{} ({})\n{:?}", self.message, self.error_kind, *backtrace)
            }
        }
    }
}

impl Error for RepositoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref() as &(dyn Error + 'static)),
            None => None,
        }
    }
}

/// A result type alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        RepositoryError::new_with_cause(
            &format!("MongoDB error: {}", err),
            ErrorKind::BackendError,
            err,
        )
    }
}

impl From<bson::ser::Error> for RepositoryError {
    fn from(err: bson::ser::Error) -> Self {
        RepositoryError::new_with_cause(
            &format!("Failed to serialize entity: {}", err),
            ErrorKind::ObjectMappingError,
            err,
        )
    }
}

impl From<bson::de::Error> for RepositoryError {
    fn from(err: bson::de::Error) -> Self {
        RepositoryError::new_with_cause(
            &format!("Failed to deserialize entity: {}", err),
            ErrorKind::ObjectMappingError,
            err,
        )
    }
}

impl From<bson::oid::Error> for RepositoryError {
    fn from(err: bson::oid::Error) -> Self {
        RepositoryError::new_with_cause(
            &format!("Invalid object id: {}", err),
            ErrorKind::InvalidId,
            err,
        )
    }
}

impl From<regex::Error> for RepositoryError {
    fn from(err: regex::Error) -> Self {
        RepositoryError::new_with_cause(
            &format!("Invalid regex pattern: {}", err),
            ErrorKind::FilterError,
            err,
        )
    }
}

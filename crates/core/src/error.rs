//! Error types for the keeper core, and the catalogue that maps error codes to the
//! messages shown to API clients.

use std::collections::HashMap;

use keeper_types::TextError;

/// Stable numeric codes reported to API clients.
///
/// The numbers are part of the public error contract and must not be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Database = 1,
    Marshal = 2,
    BodyRequired = 4,
    InvalidPath = 5,
    NotFound = 6,
    NotValid = 7,
    Exists = 8,
    RequiredField = 9,
}

impl ErrorCode {
    /// Every known code, in numeric order.
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::Database,
        ErrorCode::Marshal,
        ErrorCode::BodyRequired,
        ErrorCode::InvalidPath,
        ErrorCode::NotFound,
        ErrorCode::NotValid,
        ErrorCode::Exists,
        ErrorCode::RequiredField,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Read-only mapping from [`ErrorCode`] to a client-facing message.
///
/// Built once at startup and handed to the components that render errors. It is never
/// mutated after construction.
#[derive(Clone, Debug)]
pub struct ErrorCatalog {
    messages: HashMap<ErrorCode, String>,
}

impl ErrorCatalog {
    /// The default catalogue used by the service.
    pub fn standard() -> Self {
        let messages = ErrorCode::ALL
            .iter()
            .map(|code| {
                let message = match code {
                    ErrorCode::Database => "database error",
                    ErrorCode::Marshal => "marshal error",
                    ErrorCode::BodyRequired => "body required",
                    ErrorCode::InvalidPath => "invalid path",
                    ErrorCode::NotFound => "not found",
                    ErrorCode::NotValid => "not valid",
                    ErrorCode::Exists => "already exists",
                    ErrorCode::RequiredField => "required field is missing",
                };
                (*code, message.to_owned())
            })
            .collect();
        Self { messages }
    }

    /// Returns a copy of the catalogue with the message for `code` replaced.
    pub fn with_message(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        self.messages.insert(code, message.into());
        self
    }

    pub fn message(&self, code: ErrorCode) -> &str {
        self.messages
            .get(&code)
            .map(String::as_str)
            .unwrap_or("unknown error")
    }
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeeperError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to serialize: {0}")]
    Marshal(#[from] serde_json::Error),
    #[error("body required")]
    BodyRequired,
    #[error("{0} not found")]
    NotFound(String),
    #[error("not valid: {0}")]
    NotValid(String),
    #[error("{0} already exists")]
    Exists(String),
    #[error("required field is missing: {}", .0.join(", "))]
    RequiredField(Vec<String>),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl KeeperError {
    pub fn code(&self) -> ErrorCode {
        match self {
            KeeperError::Database(_) | KeeperError::InvalidConfig(_) => ErrorCode::Database,
            KeeperError::Marshal(_) => ErrorCode::Marshal,
            KeeperError::BodyRequired => ErrorCode::BodyRequired,
            KeeperError::NotFound(_) => ErrorCode::NotFound,
            KeeperError::NotValid(_) => ErrorCode::NotValid,
            KeeperError::Exists(_) => ErrorCode::Exists,
            KeeperError::RequiredField(_) => ErrorCode::RequiredField,
        }
    }

    /// Names of the missing fields, for [`KeeperError::RequiredField`].
    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            KeeperError::RequiredField(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, KeeperError::NotFound(_))
    }
}

impl From<TextError> for KeeperError {
    fn from(err: TextError) -> Self {
        KeeperError::NotValid(err.to_string())
    }
}

pub type KeeperResult<T> = std::result::Result<T, KeeperError>;

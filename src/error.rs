//! Error types for record access.
//!
//! A missing record is never an error: reads report absence with `Ok(None)`.

use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext};
use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the store.
#[derive(Debug, Error)]
pub enum Error {
    /// The store reported that the table does not exist.
    #[error("table '{table_name}' not found")]
    TableNotFound {
        /// The name of the missing table.
        table_name: String,
    },

    /// The store refused to create a table that already exists.
    #[error("table '{table_name}' already exists")]
    TableAlreadyExists {
        /// The name of the existing table.
        table_name: String,
    },

    /// The table did not become active before the configured timeout.
    #[error("timeout waiting for table '{table_name}' to become active")]
    TableActivationTimeout {
        /// The name of the table being waited on.
        table_name: String,
    },

    /// The store rejected the request as malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other failure reported by the store or the transport.
    #[error("{operation} failed: {message}")]
    Service {
        /// The store operation that failed.
        operation: &'static str,
        /// The underlying error with its full cause chain rendered.
        message: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A record or key could not be converted to or from attribute values.
    #[error("marshaling error: {0}")]
    Marshal(#[from] serde_dynamo::Error),

    /// A marshaled key lacks the named key attribute.
    #[error("key is missing attribute '{0}'")]
    MissingKeyAttribute(String),

    /// A request could not be built.
    #[error("invalid request: {0}")]
    Build(#[from] BuildError),
}

impl Error {
    /// Whether this error is the store's "resource not found" condition.
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound { .. })
    }

    pub(crate) fn service(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let source = source.into();
        Self::Service {
            operation,
            message: source.to_string(),
            source,
        }
    }

    /// Like [`Error::service`], keeping the service's code and message.
    ///
    /// An SDK error displays only its kind ("service error"); the context
    /// rendering walks the cause chain down to the service response.
    pub(crate) fn sdk<E>(operation: &'static str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Service {
            operation,
            message: DisplayErrorContext(&error).to_string(),
            source: Box::new(error),
        }
    }
}

//! Defines the crate level error type and how errors are classified and shown to users.

use crate::transaction::TransactionType;

/// The errors that may occur in the ledger.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A field of the input was malformed or out of range.
    ///
    /// `field` names the offending input field so the caller can attach the
    /// message to the right form control.
    #[error("invalid {field}: {message}")]
    Validation {
        /// The name of the input field that failed validation.
        field: &'static str,
        /// A description of what is wrong with the field.
        message: String,
    },

    /// A category with the same name and type already exists for the user.
    #[error("an {kind} category named \"{name}\" already exists")]
    DuplicateCategory {
        /// The name that clashed.
        name: String,
        /// The type of the category.
        kind: TransactionType,
    },

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category named in a transaction does not exist for the user and type.
    #[error("the {kind} category \"{name}\" could not be found")]
    CategoryNotFound {
        /// The category name that was looked up.
        name: String,
        /// The transaction type the category was looked up for.
        kind: TransactionType,
    },

    /// Tried to update a transaction that does not exist or belongs to another user.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or belongs to another user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a category that does not exist.
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// No caller identity could be resolved.
    #[error("no authenticated user")]
    Unauthenticated,

    /// An unhandled/unexpected SQL error.
    ///
    /// The SQL transaction the error occurred in has been rolled back, so the
    /// operation can be retried as a whole.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// A bulk import failed and nothing was persisted.
    #[error("could not import transactions: {0}")]
    Import(Box<Error>),
}

/// The broad classes of [Error], used to decide how a failure is presented
/// and whether it may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// A referenced category or transaction is absent.
    NotFound,
    /// No resolvable caller identity.
    Auth,
    /// The store transaction failed and was rolled back.
    Persistence,
    /// A bulk import failed.
    Import,
}

impl Error {
    /// Create a [Error::Validation] for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } | Error::DuplicateCategory { .. } => ErrorKind::Validation,
            Error::NotFound
            | Error::CategoryNotFound { .. }
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::DeleteMissingCategory => ErrorKind::NotFound,
            Error::Unauthenticated => ErrorKind::Auth,
            Error::SqlError(_) => ErrorKind::Persistence,
            Error::Import(_) => ErrorKind::Import,
        }
    }

    /// Whether retrying the whole operation could succeed.
    ///
    /// Only store failures are retryable, since they leave no partial state.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Import(cause) => cause.is_retryable(),
            error => error.kind() == ErrorKind::Persistence,
        }
    }

    /// A message that can be shown to the user.
    ///
    /// Validation, not-found and auth errors produce actionable text.
    /// Store failures are not intended to be shown to the user and produce a
    /// generic "try again" message instead.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { field, message } => format!("Check the {field}: {message}."),
            Error::DuplicateCategory { name, kind } => format!(
                "You already have an {kind} category called \"{name}\". \
                Choose a different name, or use the existing category."
            ),
            Error::CategoryNotFound { name, kind } => format!(
                "Could not find an {kind} category called \"{name}\". \
                Create the category first, or pick an existing one."
            ),
            Error::NotFound => "The requested item could not be found.".to_owned(),
            Error::UpdateMissingTransaction => {
                "The transaction could not be found. \
                Try refreshing the page to see if it has been deleted."
                    .to_owned()
            }
            Error::DeleteMissingTransaction => "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted."
                .to_owned(),
            Error::DeleteMissingCategory => "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted."
                .to_owned(),
            Error::Unauthenticated => "Please sign in to continue.".to_owned(),
            Error::Import(_) => {
                "Import failed. Nothing was saved, please try again later.".to_owned()
            }
            Error::SqlError(_) => {
                "Something went wrong while saving your changes. Please try again.".to_owned()
            }
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use crate::{
        Error,
        error::ErrorKind,
        transaction::TransactionType,
    };

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn sql_errors_are_retryable_persistence_errors() {
        let error: Error = rusqlite::Error::InvalidQuery.into();

        assert_eq!(error.kind(), ErrorKind::Persistence);
        assert!(error.is_retryable());
    }

    #[test]
    fn import_error_inherits_retryability_from_cause() {
        let from_store = Error::Import(Box::new(Error::SqlError(rusqlite::Error::InvalidQuery)));
        let from_input = Error::Import(Box::new(Error::validation("amount", "must be positive")));

        assert_eq!(from_store.kind(), ErrorKind::Import);
        assert!(from_store.is_retryable());
        assert!(!from_input.is_retryable());
    }

    #[test]
    fn validation_message_names_field() {
        let error = Error::validation("amount", "must be greater than zero");

        assert_eq!(
            error.user_message(),
            "Check the amount: must be greater than zero."
        );
        assert!(!error.is_retryable());
    }

    #[test]
    fn persistence_message_is_generic() {
        let error = Error::SqlError(rusqlite::Error::InvalidQuery);

        assert!(error.user_message().contains("try again"));
        assert!(!error.user_message().contains("SQL"));
    }

    #[test]
    fn category_not_found_is_not_found_kind() {
        let error = Error::CategoryNotFound {
            name: "Gym".to_owned(),
            kind: TransactionType::Expense,
        };

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(error.user_message().contains("Gym"));
    }
}

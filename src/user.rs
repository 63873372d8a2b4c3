//! The identity of the user that owns ledger data.
//!
//! Users are managed by an external identity provider. The ledger only ever
//! sees the opaque ID string it hands out, which is passed explicitly into
//! every user scoped operation.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for the opaque user IDs issued by the identity provider.
///
/// This helps disambiguate user IDs from other strings, such as category
/// names, leading to better compile time errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user ID from the identity provider's ID string.
    ///
    /// # Errors
    ///
    /// Returns [Error::Unauthenticated] if `id` is empty or only whitespace.
    pub fn new(id: &str) -> Result<Self, Error> {
        let id = id.trim();

        if id.is_empty() {
            Err(Error::Unauthenticated)
        } else {
            Ok(Self(id.to_owned()))
        }
    }

    /// Resolve the caller's identity, which may be absent if the request was
    /// not authenticated.
    ///
    /// # Errors
    ///
    /// Returns [Error::Unauthenticated] if there is no identity or it is blank.
    pub fn from_identity(identity: Option<&str>) -> Result<Self, Error> {
        identity.map_or(Err(Error::Unauthenticated), Self::new)
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

#[cfg(test)]
mod user_id_tests {
    use crate::{Error, user::UserId};

    #[test]
    fn new_trims_whitespace() {
        let id = UserId::new("  user_2abc ").unwrap();

        assert_eq!(id.as_str(), "user_2abc");
    }

    #[test]
    fn new_fails_on_blank_id() {
        assert_eq!(UserId::new(" \t"), Err(Error::Unauthenticated));
    }

    #[test]
    fn missing_identity_is_unauthenticated() {
        assert_eq!(UserId::from_identity(None), Err(Error::Unauthenticated));
    }

    #[test]
    fn deserialization_rejects_blank_id() {
        let result: Result<UserId, _> = serde_json::from_str("\"  \"");

        assert!(result.is_err());
    }

    #[test]
    fn deserialization_trims_id() {
        let id: UserId = serde_json::from_str("\" user_1 \"").unwrap();

        assert_eq!(id, UserId::new("user_1").unwrap());
    }

    #[test]
    fn present_identity_resolves() {
        let id = UserId::from_identity(Some("user_1")).unwrap();

        assert_eq!(id.to_string(), "user_1");
    }
}

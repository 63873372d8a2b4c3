//! Per user preferences.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, user::UserId};

/// The currency amounts are displayed in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Argentine peso.
    #[default]
    Ars,
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// The ISO 4217 code of the currency.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ARS" => Ok(Currency::Ars),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(Error::validation(
                "currency",
                format!("\"{s}\" is not one of ARS, USD or EUR"),
            )),
        }
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// What a user may do in the application.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Manages their own ledger.
    #[default]
    User,
    /// Can also manage the application.
    Admin,
}

impl UserRole {
    /// The role as it is stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(Error::validation(
                "role",
                format!("\"{s}\" is not one of user or admin"),
            )),
        }
    }
}

impl ToSql for UserRole {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for UserRole {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The preferences of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSettings {
    /// Who the settings belong to.
    pub user_id: UserId,
    /// The display currency.
    pub currency: Currency,
    /// What the user may do.
    pub role: UserRole,
}

/// Get the settings of `user_id`, creating the defaults on first use.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_user_settings(user_id: &UserId, connection: &Connection) -> Result<UserSettings, Error> {
    connection.execute(
        "INSERT INTO user_settings (user_id, currency, role) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO NOTHING",
        (user_id, Currency::default(), UserRole::default()),
    )?;

    select_user_settings(user_id, connection)
}

fn select_user_settings(user_id: &UserId, connection: &Connection) -> Result<UserSettings, Error> {
    let settings = connection.query_row(
        "SELECT user_id, currency, role FROM user_settings WHERE user_id = ?1",
        [user_id],
        |row| {
            Ok(UserSettings {
                user_id: row.get(0)?,
                currency: row.get(1)?,
                role: row.get(2)?,
            })
        },
    )?;

    Ok(settings)
}

/// Change the display currency of `user_id` to the currency with the code `currency`.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if `currency` is not a supported currency code,
/// - or [Error::SqlError] if there is an SQL error.
pub fn update_user_currency(
    user_id: &UserId,
    currency: &str,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    let currency: Currency = currency.parse()?;

    connection.execute(
        "INSERT INTO user_settings (user_id, currency, role) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET currency = excluded.currency",
        (user_id, currency, UserRole::default()),
    )?;

    tracing::info!("set currency of user {user_id} to {currency}");

    select_user_settings(user_id, connection)
}

/// Change the role of `user_id` to the role named `role`.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if `role` is not a known role,
/// - or [Error::SqlError] if there is an SQL error.
pub fn update_user_role(
    user_id: &UserId,
    role: &str,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    let role: UserRole = role.parse()?;

    connection.execute(
        "INSERT INTO user_settings (user_id, currency, role) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET role = excluded.role",
        (user_id, Currency::default(), role),
    )?;

    tracing::info!("set role of user {user_id} to {role}");

    select_user_settings(user_id, connection)
}

/// Create the user settings table.
pub fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT PRIMARY KEY NOT NULL,
            currency TEXT NOT NULL DEFAULT 'ARS',
            role TEXT NOT NULL DEFAULT 'user'
        )",
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod user_settings_tests {
    use crate::{
        Error,
        test_utils::{get_test_connection, other_user, test_user},
        user_settings::{
            Currency, UserRole, get_user_settings, update_user_currency, update_user_role,
        },
    };

    #[test]
    fn first_read_creates_defaults() {
        let conn = get_test_connection();

        let settings = get_user_settings(&test_user(), &conn).unwrap();

        assert_eq!(settings.currency, Currency::Ars);
        assert_eq!(settings.role, UserRole::User);
        assert_eq!(settings.user_id, test_user());
    }

    #[test]
    fn update_parses_code_case_insensitively() {
        let conn = get_test_connection();

        update_user_currency(&test_user(), "usd", &conn).unwrap();

        assert_eq!(
            get_user_settings(&test_user(), &conn).unwrap().currency,
            Currency::Usd
        );
        assert_eq!(
            get_user_settings(&other_user(), &conn).unwrap().currency,
            Currency::Ars
        );
    }

    #[test]
    fn update_rejects_unknown_code() {
        let conn = get_test_connection();

        let result = update_user_currency(&test_user(), "GBP", &conn);

        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "currency",
                ..
            })
        ));
    }

    #[test]
    fn currency_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
    }

    #[test]
    fn update_role_keeps_currency() {
        let conn = get_test_connection();
        update_user_currency(&test_user(), "EUR", &conn).unwrap();

        let settings = update_user_role(&test_user(), " Admin ", &conn).unwrap();

        assert_eq!(settings.role, UserRole::Admin);
        assert_eq!(settings.currency, Currency::Eur);
        assert_eq!(get_user_settings(&test_user(), &conn).unwrap(), settings);
        assert_eq!(
            get_user_settings(&other_user(), &conn).unwrap().role,
            UserRole::User
        );
    }

    #[test]
    fn update_role_rejects_unknown_role() {
        let conn = get_test_connection();

        let result = update_user_role(&test_user(), "owner", &conn);

        assert!(matches!(
            result,
            Err(Error::Validation { field: "role", .. })
        ));
    }
}

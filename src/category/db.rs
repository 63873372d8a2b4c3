//! Database operations for categories.

use std::collections::{HashMap, HashSet};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryKey, CategoryName, NewCategory},
    transaction::TransactionType,
    user::UserId,
};

/// The categories a batch of transactions refers to, keyed by name and type.
#[derive(Debug, Default, PartialEq)]
pub struct EnsuredCategories {
    /// Every requested category as stored in the directory.
    pub categories: HashMap<CategoryKey, Category>,
    /// How many of the categories did not exist before.
    pub created: usize,
}

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategory] if the user already has a category of the
///   same type whose name only differs in case,
/// - or [Error::SqlError] there is some other SQL error.
pub fn create_category(
    user_id: &UserId,
    category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let created = connection
        .prepare(
            "INSERT INTO category (user_id, name, icon, type) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, icon, type",
        )?
        .query_row(
            (user_id, category.name.as_ref(), &category.icon, category.kind),
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategory {
                name: category.name.to_string(),
                kind: category.kind,
            },
            error => error.into(),
        })?;

    tracing::debug!("created {} category {}", created.kind, created.name);

    Ok(created)
}

/// Look up the category of type `kind` called `name`, ignoring case.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if `user_id` has no such category,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_category(
    user_id: &UserId,
    name: &str,
    kind: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare_cached(
            "SELECT id, user_id, name, icon, type FROM category
             WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE AND type = ?3",
        )?
        .query_row((user_id, name.trim(), kind), map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::CategoryNotFound {
                name: name.trim().to_owned(),
                kind,
            },
            error => error.into(),
        })
}

/// Retrieve the categories of `user_id` ordered alphabetically by name,
/// optionally only those of type `kind`.
pub fn get_categories(
    user_id: &UserId,
    kind: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, icon, type FROM category
             WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
             ORDER BY name COLLATE NOCASE ASC, type ASC",
        )?
        .query_map((user_id, kind), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Delete the category of type `kind` called `name`, ignoring case.
///
/// Transactions that used the category keep their copy of its name and icon.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if the category doesn't exist.
pub fn delete_category(
    user_id: &UserId,
    name: &str,
    kind: TransactionType,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE AND type = ?3",
        (user_id, name.trim(), kind),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Make sure every requested category exists for `user_id`, creating the
/// missing ones, and return all of them as stored.
///
/// Requests are deduplicated by name, ignoring case, and type. When the
/// same category is requested more than once, the first request decides the
/// spelling and icon of a newly created category. Existing categories are
/// never changed.
///
/// This should be called inside an SQL transaction so that the created
/// categories are rolled back along with everything else on failure.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn ensure_categories(
    user_id: &UserId,
    requests: &[NewCategory],
    connection: &Connection,
) -> Result<EnsuredCategories, Error> {
    let mut unique_requests: Vec<&NewCategory> = Vec::new();
    let mut seen = HashSet::new();

    for request in requests {
        if seen.insert(request.key()) {
            unique_requests.push(request);
        }
    }

    let mut created = 0;
    {
        let mut insert_statement = connection.prepare_cached(
            "INSERT INTO category (user_id, name, icon, type) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT DO NOTHING",
        )?;

        for request in &unique_requests {
            created += insert_statement.execute((
                user_id,
                request.name.as_ref(),
                &request.icon,
                request.kind,
            ))?;
        }
    }

    let mut categories = HashMap::with_capacity(unique_requests.len());
    for request in unique_requests {
        let category = get_category(user_id, request.name.as_ref(), request.kind, connection)?;
        categories.insert(request.key(), category);
    }

    Ok(EnsuredCategories {
        categories,
        created,
    })
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_user_name_type
            ON category(user_id, name COLLATE NOCASE, type);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: CategoryName::from_stored(row.get(2)?),
        icon: row.get(3)?,
        kind: row.get(4)?,
    })
}

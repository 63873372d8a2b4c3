//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, transaction::TransactionType, user::UserId};

/// The icon given to imported categories that do not specify one.
pub const DEFAULT_CATEGORY_ICON: &str = "📦";

/// The trimmed, non-blank name of a category, in the casing the user typed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Validate a name entered by the user.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] on the `category` field if `name` is
    /// blank.
    pub fn new(name: &str) -> Result<Self, Error> {
        match name.trim() {
            "" => Err(Error::validation("category", "must not be empty")),
            name => Ok(Self(name.to_owned())),
        }
    }

    /// Wrap a name read back from the category table, which only holds
    /// names that passed [CategoryName::new].
    pub(crate) fn from_stored(name: String) -> Self {
        Self(name)
    }
}

impl TryFrom<String> for CategoryName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A user defined label for transactions of one type, e.g. 'Groceries' for
/// expenses or 'Salary' for income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserId,
    /// The name with the casing it was created with.
    pub name: CategoryName,
    /// A short display icon, usually a single emoji.
    pub icon: String,
    /// The type of transaction the category applies to.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Category {
    /// The key that identifies this category within the user's directory.
    pub fn key(&self) -> CategoryKey {
        CategoryKey::new(self.name.as_ref(), self.kind)
    }
}

/// The validated fields for creating a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// The category name.
    pub name: CategoryName,
    /// The category icon.
    pub icon: String,
    /// The type of transaction the category applies to.
    pub kind: TransactionType,
}

impl NewCategory {
    /// Validate the fields of a new category.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the name or icon is blank.
    pub fn new(name: &str, icon: &str, kind: TransactionType) -> Result<Self, Error> {
        let name = CategoryName::new(name)?;
        let icon = icon.trim();

        if icon.is_empty() {
            return Err(Error::validation("icon", "must not be empty"));
        }

        Ok(Self {
            name,
            icon: icon.to_owned(),
            kind,
        })
    }

    /// The key that identifies the category within the user's directory.
    pub fn key(&self) -> CategoryKey {
        CategoryKey::new(self.name.as_ref(), self.kind)
    }
}

/// Identifies a category within one user's directory.
///
/// Names are compared ignoring ASCII case, the same way the database's
/// unique index compares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryKey {
    name: String,
    kind: TransactionType,
}

impl CategoryKey {
    /// Create the key for a category called `name` of type `kind`.
    pub fn new(name: &str, kind: TransactionType) -> Self {
        Self {
            name: name.trim().to_ascii_lowercase(),
            kind,
        }
    }
}

//! The category directory: user defined labels for transactions.

mod db;
mod domain;

pub use db::{
    EnsuredCategories, create_category, create_category_table, delete_category,
    ensure_categories, get_categories, get_category,
};
pub use domain::{
    Category, CategoryId, CategoryKey, CategoryName, DEFAULT_CATEGORY_ICON, NewCategory,
};

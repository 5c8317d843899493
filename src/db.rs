mod schema;

pub use schema::Database;

use crate::book::Book;
use serde::{Deserialize, Serialize};

/// User account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: String,
    /// Username for login.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account creation timestamp.
    pub created_at: i64,
    /// Last login timestamp.
    pub last_login: Option<i64>,
}

/// Authentication session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session token.
    pub token: String,
    /// User ID.
    pub user_id: String,
    /// Expiration timestamp.
    pub expires_at: i64,
}

/// Category aggregation row: one category and its book count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Numeric category id.
    pub category: i64,
    /// Category display text.
    pub category_text: String,
    /// Number of books in the category.
    pub num: i64,
}

/// Home-page aggregation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeData {
    /// Total catalog size.
    pub total: u64,
    /// Top categories by book count.
    pub categories: Vec<CategoryCount>,
    /// Most recently updated books.
    pub recent: Vec<Book>,
}

/// Filters and paging for the list operation.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Title substring match.
    pub title: Option<String>,
    /// Author substring match.
    pub author: Option<String>,
    /// Exact category match.
    pub category: Option<i64>,
    /// Page number, 1-based.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
}

/// Current Unix timestamp in seconds.
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

use crate::book::{Book, ContentItem};
use crate::db::*;
use crate::error::{AppError, Result};
use crate::stats::{AreaRecord, CityRecord, DailyRecord, ProvinceRecord};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Database wrapper for thread-safe access.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Users table
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                last_login INTEGER
            );

            -- Sessions table
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Catalog table, keyed by the generated upload file name
            CREATE TABLE IF NOT EXISTS books (
                file_name TEXT PRIMARY KEY,
                original_name TEXT,
                file_path TEXT,
                title TEXT NOT NULL,
                author TEXT NOT NULL DEFAULT '',
                publisher TEXT,
                language TEXT,
                cover TEXT,
                root_file TEXT,
                category INTEGER,
                category_text TEXT,
                username TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Table-of-contents rows per book
            CREATE TABLE IF NOT EXISTS book_contents (
                file_name TEXT NOT NULL,
                nav_id TEXT NOT NULL,
                label TEXT NOT NULL,
                href TEXT NOT NULL,
                play_order INTEGER NOT NULL,
                FOREIGN KEY (file_name) REFERENCES books(file_name) ON DELETE CASCADE
            );

            -- Epidemic stats: per-area incremental rows
            CREATE TABLE IF NOT EXISTS stats_area (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                province_name TEXT NOT NULL,
                current_confirmed INTEGER NOT NULL DEFAULT 0,
                confirmed INTEGER NOT NULL DEFAULT 0,
                cured INTEGER NOT NULL DEFAULT 0,
                dead INTEGER NOT NULL DEFAULT 0,
                current_confirmed_incr INTEGER NOT NULL DEFAULT 0,
                confirmed_incr INTEGER NOT NULL DEFAULT 0,
                cured_incr INTEGER NOT NULL DEFAULT 0,
                dead_incr INTEGER NOT NULL DEFAULT 0
            );

            -- Epidemic stats: per-province aggregates
            CREATE TABLE IF NOT EXISTS stats_province (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                province_name TEXT NOT NULL,
                current_confirmed INTEGER NOT NULL DEFAULT 0,
                confirmed INTEGER NOT NULL DEFAULT 0,
                cured INTEGER NOT NULL DEFAULT 0,
                dead INTEGER NOT NULL DEFAULT 0
            );

            -- Epidemic stats: per-city rows tagged with their province
            CREATE TABLE IF NOT EXISTS stats_city (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                province_name TEXT NOT NULL,
                city_name TEXT NOT NULL,
                current_confirmed INTEGER NOT NULL DEFAULT 0,
                confirmed INTEGER NOT NULL DEFAULT 0,
                cured INTEGER NOT NULL DEFAULT 0,
                dead INTEGER NOT NULL DEFAULT 0
            );

            -- Epidemic stats: national daily rows
            CREATE TABLE IF NOT EXISTS stats_daily (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                current_confirmed INTEGER NOT NULL DEFAULT 0,
                confirmed INTEGER NOT NULL DEFAULT 0,
                cured INTEGER NOT NULL DEFAULT 0,
                dead INTEGER NOT NULL DEFAULT 0
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_books_category ON books(category);
            CREATE INDEX IF NOT EXISTS idx_books_updated ON books(updated_at);
            CREATE INDEX IF NOT EXISTS idx_contents_book ON book_contents(file_name);
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
            CREATE INDEX IF NOT EXISTS idx_city_province ON stats_city(province_name);
            "#,
        )
        .map_err(|e| AppError::Internal(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== USER OPERATIONS ==========

    /// Create a new user.
    pub fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.username,
                user.password_hash,
                user.created_at,
                user.last_login,
            ],
        )
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Validation(format!("Username '{}' already exists", user.username))
            } else {
                AppError::Internal(format!("Failed to create user: {}", e))
            }
        })?;
        Ok(())
    }

    /// Get user by username.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, username, password_hash, created_at, last_login
             FROM users WHERE username = ?1",
            params![username],
            Self::row_to_user,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    /// Get user by ID.
    pub fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, username, password_hash, created_at, last_login
             FROM users WHERE id = ?1",
            params![id],
            Self::row_to_user,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
            last_login: row.get(4)?,
        })
    }

    /// Record the last login time for a user.
    pub fn update_user_last_login(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE users SET last_login = ?1 WHERE id = ?2",
            params![now_timestamp(), id],
        )
        .map_err(|e| AppError::Internal(format!("Failed to update last login: {}", e)))?;
        Ok(())
    }

    /// Change a user's password hash. Returns false when the user is unknown.
    pub fn update_user_password(&self, username: &str, password_hash: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE users SET password_hash = ?1 WHERE username = ?2",
                params![password_hash, username],
            )
            .map_err(|e| AppError::Internal(format!("Failed to update password: {}", e)))?;
        Ok(changed > 0)
    }

    /// Delete a user. Returns false when the user is unknown.
    pub fn delete_user(&self, username: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM users WHERE username = ?1", params![username])
            .map_err(|e| AppError::Internal(format!("Failed to delete user: {}", e)))?;
        Ok(deleted > 0)
    }

    /// List all users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, username, password_hash, created_at, last_login
                 FROM users ORDER BY username",
            )
            .map_err(|e| AppError::Internal(format!("Failed to list users: {}", e)))?;

        let users = stmt
            .query_map([], Self::row_to_user)
            .map_err(|e| AppError::Internal(format!("Failed to list users: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Internal(format!("Failed to list users: {}", e)))?;

        Ok(users)
    }

    // ========== SESSION OPERATIONS ==========

    /// Create a session.
    pub fn create_session(&self, session: &Session) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![session.token, session.user_id, session.expires_at],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create session: {}", e)))?;
        Ok(())
    }

    /// Get a session by token.
    pub fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT token, user_id, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| {
                Ok(Session {
                    token: row.get(0)?,
                    user_id: row.get(1)?,
                    expires_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get session: {}", e)))
    }

    /// Delete a session.
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])
            .map_err(|e| AppError::Internal(format!("Failed to delete session: {}", e)))?;
        Ok(())
    }

    /// Remove all expired sessions.
    pub fn cleanup_expired_sessions(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![now_timestamp()],
        )
        .map_err(|e| AppError::Internal(format!("Failed to cleanup sessions: {}", e)))?;
        Ok(())
    }

    // ========== BOOK OPERATIONS ==========

    /// Insert a new catalog entry. A duplicate `fileName` is an error.
    pub fn insert_book(&self, book: &Book) -> Result<()> {
        if book.file_name.is_empty() {
            return Err(AppError::Validation("fileName must not be empty".into()));
        }

        let conn = self.conn.lock();
        let now = now_timestamp();

        conn.execute(
            "INSERT INTO books (file_name, original_name, file_path, title, author, publisher,
                                language, cover, root_file, category, category_text, username,
                                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                book.file_name,
                book.original_name,
                book.file_path.as_ref().map(|p| p.to_string_lossy().to_string()),
                book.title,
                book.author,
                book.publisher,
                book.language,
                book.cover,
                book.root_file,
                book.category,
                book.category_text,
                book.username,
                now,
                now,
            ],
        )
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Upstream(format!("book '{}' already exists", book.file_name))
            } else {
                AppError::Upstream(format!("Failed to insert book: {}", e))
            }
        })?;

        Self::replace_contents(&conn, &book.file_name, &book.contents)?;
        Ok(())
    }

    /// Update an existing catalog entry.
    pub fn update_book(&self, book: &Book) -> Result<()> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE books SET title = ?1, author = ?2, publisher = ?3, language = ?4,
                                  cover = ?5, root_file = ?6, category = ?7, category_text = ?8,
                                  username = ?9, updated_at = ?10
                 WHERE file_name = ?11",
                params![
                    book.title,
                    book.author,
                    book.publisher,
                    book.language,
                    book.cover,
                    book.root_file,
                    book.category,
                    book.category_text,
                    book.username,
                    now_timestamp(),
                    book.file_name,
                ],
            )
            .map_err(|e| AppError::Upstream(format!("Failed to update book: {}", e)))?;

        if changed == 0 {
            return Err(AppError::NotFound(book.file_name.clone()));
        }

        if !book.contents.is_empty() {
            Self::replace_contents(&conn, &book.file_name, &book.contents)?;
        }
        Ok(())
    }

    fn replace_contents(
        conn: &Connection,
        file_name: &str,
        contents: &[ContentItem],
    ) -> Result<()> {
        conn.execute(
            "DELETE FROM book_contents WHERE file_name = ?1",
            params![file_name],
        )
        .map_err(|e| AppError::Upstream(format!("Failed to replace contents: {}", e)))?;

        for item in contents {
            conn.execute(
                "INSERT INTO book_contents (file_name, nav_id, label, href, play_order)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![file_name, item.nav_id, item.label, item.href, item.play_order],
            )
            .map_err(|e| AppError::Upstream(format!("Failed to insert contents: {}", e)))?;
        }
        Ok(())
    }

    /// Fetch a catalog entry with its contents.
    pub fn get_book(&self, file_name: &str) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        let book = conn
            .query_row(
                "SELECT file_name, original_name, file_path, title, author, publisher, language,
                        cover, root_file, category, category_text, username
                 FROM books WHERE file_name = ?1",
                params![file_name],
                Self::row_to_book,
            )
            .optional()
            .map_err(|e| AppError::Upstream(format!("Failed to get book: {}", e)))?;

        let Some(mut book) = book else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare(
                "SELECT nav_id, label, href, play_order FROM book_contents
                 WHERE file_name = ?1 ORDER BY play_order",
            )
            .map_err(|e| AppError::Upstream(format!("Failed to get contents: {}", e)))?;

        book.contents = stmt
            .query_map(params![file_name], |row| {
                Ok(ContentItem {
                    nav_id: row.get(0)?,
                    label: row.get(1)?,
                    href: row.get(2)?,
                    play_order: row.get(3)?,
                })
            })
            .map_err(|e| AppError::Upstream(format!("Failed to get contents: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to get contents: {}", e)))?;

        Ok(Some(book))
    }

    fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
        Ok(Book {
            file_name: row.get(0)?,
            original_name: row.get(1)?,
            file_path: row.get::<_, Option<String>>(2)?.map(PathBuf::from),
            title: row.get(3)?,
            author: row.get(4)?,
            publisher: row.get(5)?,
            language: row.get(6)?,
            cover: row.get(7)?,
            root_file: row.get(8)?,
            category: row.get(9)?,
            category_text: row.get(10)?,
            username: row.get(11)?,
            contents: Vec::new(),
        })
    }

    /// Delete a catalog entry. Returns false when the entry is unknown.
    pub fn delete_book(&self, file_name: &str) -> Result<bool> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM book_contents WHERE file_name = ?1",
            params![file_name],
        )
        .map_err(|e| AppError::Upstream(format!("Failed to delete contents: {}", e)))?;

        let deleted = conn
            .execute("DELETE FROM books WHERE file_name = ?1", params![file_name])
            .map_err(|e| AppError::Upstream(format!("Failed to delete book: {}", e)))?;
        Ok(deleted > 0)
    }

    /// Paginated listing with optional filters. Returns rows and the total
    /// match count before paging.
    pub fn list_books(&self, filter: &ListFilter) -> Result<(Vec<Book>, u64)> {
        let mut where_clauses: Vec<String> = Vec::new();
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = &filter.title
            && !title.is_empty()
        {
            where_clauses.push(format!("title LIKE ?{}", args.len() + 1));
            args.push(Box::new(format!("%{}%", title)));
        }
        if let Some(author) = &filter.author
            && !author.is_empty()
        {
            where_clauses.push(format!("author LIKE ?{}", args.len() + 1));
            args.push(Box::new(format!("%{}%", author)));
        }
        if let Some(category) = filter.category {
            where_clauses.push(format!("category = ?{}", args.len() + 1));
            args.push(Box::new(category));
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let conn = self.conn.lock();

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM books{}", where_sql),
                rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
                |row| row.get(0),
            )
            .map_err(|e| AppError::Upstream(format!("Failed to count books: {}", e)))?;

        // Widen before the offset math; query values go up to u32::MAX and
        // SQLite only accepts i64 LIMIT/OFFSET values
        let page = filter.page.max(1) as i64;
        let page_size = filter.page_size.max(1) as i64;
        let offset = (page - 1).saturating_mul(page_size);

        let sql = format!(
            "SELECT file_name, original_name, file_path, title, author, publisher, language,
                    cover, root_file, category, category_text, username
             FROM books{} ORDER BY updated_at DESC, file_name
             LIMIT {} OFFSET {}",
            where_sql, page_size, offset
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AppError::Upstream(format!("Failed to list books: {}", e)))?;

        let books = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
                Self::row_to_book,
            )
            .map_err(|e| AppError::Upstream(format!("Failed to list books: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to list books: {}", e)))?;

        Ok((books, total as u64))
    }

    /// Remove every catalog entry and its contents.
    pub fn clear_books(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch("DELETE FROM book_contents; DELETE FROM books;")
            .map_err(|e| AppError::Upstream(format!("Failed to clear catalog: {}", e)))?;
        Ok(())
    }

    /// Category aggregation: one row per category with its book count.
    pub fn categories(&self) -> Result<Vec<CategoryCount>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT category, COALESCE(category_text, ''), COUNT(*) AS num
                 FROM books WHERE category IS NOT NULL
                 GROUP BY category, category_text ORDER BY num DESC, category",
            )
            .map_err(|e| AppError::Upstream(format!("Failed to aggregate categories: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    category_text: row.get(1)?,
                    num: row.get(2)?,
                })
            })
            .map_err(|e| AppError::Upstream(format!("Failed to aggregate categories: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to aggregate categories: {}", e)))?;

        Ok(rows)
    }

    /// Total catalog size.
    pub fn count_books(&self) -> Result<u64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| AppError::Upstream(format!("Failed to count books: {}", e)))
    }

    /// Most recently updated books.
    pub fn recent_books(&self, limit: u32) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT file_name, original_name, file_path, title, author, publisher, language,
                        cover, root_file, category, category_text, username
                 FROM books ORDER BY updated_at DESC, file_name LIMIT ?1",
            )
            .map_err(|e| AppError::Upstream(format!("Failed to list recent books: {}", e)))?;

        let books = stmt
            .query_map(params![limit], Self::row_to_book)
            .map_err(|e| AppError::Upstream(format!("Failed to list recent books: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to list recent books: {}", e)))?;

        Ok(books)
    }

    /// Home-page aggregation: total count, top categories, recent books.
    pub fn home(&self) -> Result<HomeData> {
        let total = self.count_books()?;
        let mut categories = self.categories()?;
        categories.truncate(5);
        let recent = self.recent_books(10)?;

        Ok(HomeData {
            total,
            categories,
            recent,
        })
    }

    // ========== STATS OPERATIONS ==========

    /// Save a per-area incremental row.
    pub fn save_area_record(&self, record: &AreaRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO stats_area (province_name, current_confirmed, confirmed, cured, dead,
                                     current_confirmed_incr, confirmed_incr, cured_incr, dead_incr)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.province_name,
                record.current_confirmed,
                record.confirmed,
                record.cured,
                record.dead,
                record.current_confirmed_incr,
                record.confirmed_incr,
                record.cured_incr,
                record.dead_incr,
            ],
        )
        .map_err(|e| AppError::Upstream(format!("Failed to save area record: {}", e)))?;
        Ok(())
    }

    /// Save a per-province aggregate row.
    pub fn save_province_record(&self, record: &ProvinceRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO stats_province (province_name, current_confirmed, confirmed, cured, dead)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.province_name,
                record.current_confirmed,
                record.confirmed,
                record.cured,
                record.dead,
            ],
        )
        .map_err(|e| AppError::Upstream(format!("Failed to save province record: {}", e)))?;
        Ok(())
    }

    /// Save a per-city row.
    pub fn save_city_record(&self, record: &CityRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO stats_city (province_name, city_name, current_confirmed, confirmed,
                                     cured, dead)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.province_name,
                record.city_name,
                record.current_confirmed,
                record.confirmed,
                record.cured,
                record.dead,
            ],
        )
        .map_err(|e| AppError::Upstream(format!("Failed to save city record: {}", e)))?;
        Ok(())
    }

    /// Save a national daily row.
    pub fn save_daily_record(&self, record: &DailyRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO stats_daily (date, current_confirmed, confirmed, cured, dead)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.date,
                record.current_confirmed,
                record.confirmed,
                record.cured,
                record.dead,
            ],
        )
        .map_err(|e| AppError::Upstream(format!("Failed to save daily record: {}", e)))?;
        Ok(())
    }

    /// List per-area rows, insertion order.
    pub fn list_area_records(&self) -> Result<Vec<AreaRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT province_name, current_confirmed, confirmed, cured, dead,
                        current_confirmed_incr, confirmed_incr, cured_incr, dead_incr
                 FROM stats_area ORDER BY id",
            )
            .map_err(|e| AppError::Upstream(format!("Failed to list area records: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(AreaRecord {
                    province_name: row.get(0)?,
                    current_confirmed: row.get(1)?,
                    confirmed: row.get(2)?,
                    cured: row.get(3)?,
                    dead: row.get(4)?,
                    current_confirmed_incr: row.get(5)?,
                    confirmed_incr: row.get(6)?,
                    cured_incr: row.get(7)?,
                    dead_incr: row.get(8)?,
                })
            })
            .map_err(|e| AppError::Upstream(format!("Failed to list area records: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to list area records: {}", e)))?;

        Ok(rows)
    }

    /// List per-province rows, insertion order.
    pub fn list_province_records(&self) -> Result<Vec<ProvinceRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT province_name, current_confirmed, confirmed, cured, dead
                 FROM stats_province ORDER BY id",
            )
            .map_err(|e| AppError::Upstream(format!("Failed to list province records: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ProvinceRecord {
                    province_name: row.get(0)?,
                    current_confirmed: row.get(1)?,
                    confirmed: row.get(2)?,
                    cured: row.get(3)?,
                    dead: row.get(4)?,
                })
            })
            .map_err(|e| AppError::Upstream(format!("Failed to list province records: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to list province records: {}", e)))?;

        Ok(rows)
    }

    /// List per-city rows, insertion order.
    pub fn list_city_records(&self) -> Result<Vec<CityRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT province_name, city_name, current_confirmed, confirmed, cured, dead
                 FROM stats_city ORDER BY id",
            )
            .map_err(|e| AppError::Upstream(format!("Failed to list city records: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CityRecord {
                    province_name: row.get(0)?,
                    city_name: row.get(1)?,
                    current_confirmed: row.get(2)?,
                    confirmed: row.get(3)?,
                    cured: row.get(4)?,
                    dead: row.get(5)?,
                })
            })
            .map_err(|e| AppError::Upstream(format!("Failed to list city records: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to list city records: {}", e)))?;

        Ok(rows)
    }

    /// List national daily rows, insertion order.
    pub fn list_daily_records(&self) -> Result<Vec<DailyRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT date, current_confirmed, confirmed, cured, dead
                 FROM stats_daily ORDER BY id",
            )
            .map_err(|e| AppError::Upstream(format!("Failed to list daily records: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(DailyRecord {
                    date: row.get(0)?,
                    current_confirmed: row.get(1)?,
                    confirmed: row.get(2)?,
                    cured: row.get(3)?,
                    dead: row.get(4)?,
                })
            })
            .map_err(|e| AppError::Upstream(format!("Failed to list daily records: {}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AppError::Upstream(format!("Failed to list daily records: {}", e)))?;

        Ok(rows)
    }
}

//! HTTP request handlers.
//!
//! One handler per endpoint: validate required parameters, call into the
//! store, reshape where needed, and wrap the outcome in the reply envelope.
//! Collaborator failures surface as [`AppError`] and are rendered at the
//! route boundary.

use crate::auth::Identity;
use crate::book::{Book, BookFields};
use crate::db::{CategoryCount, HomeData, ListFilter};
use crate::envelope::{PageInfo, Reply};
use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::stats::{self, AreaEntry, DailyRecord};
use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// BOOK CRUD
// ============================================================================

/// POST /book/upload: accept a multipart EPUB and parse its metadata.
///
/// A request without a `file` field (or with an empty one) is an app-level
/// failure: HTTP 200 with the fail envelope, and the parser is never run.
pub async fn book_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload.epub").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?;

        upload = Some((original_name, data.to_vec()));
        break;
    }

    let Some((original_name, data)) = upload.filter(|(_, data)| !data.is_empty()) else {
        return Ok(Reply::<()>::fail("upload ebook failed").into_response());
    };

    // Distinct generated name per upload, so concurrent requests cannot collide
    let ext = Path::new(&original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("epub");
    let book_dir = state.config.upload.book_dir();
    tokio::fs::create_dir_all(&book_dir).await?;

    let file_path = book_dir.join(format!("{}.{}", uuid::Uuid::new_v4(), ext));
    tokio::fs::write(&file_path, &data).await?;

    let mut book = Book::from_upload(file_path, original_name);
    if let Err(e) = book.parse().await {
        tracing::warn!(file = %book.file_name, error = %e, "Ebook parse failed");
        // Best-effort cleanup; its outcome never changes the response
        book.reset().await;
        return Err(e);
    }

    Ok(Reply::ok(book).into_response())
}

/// POST /book/create: insert a catalog entry from submitted fields.
pub async fn book_create(
    State(state): State<AppState>,
    identity: Identity,
    Json(fields): Json<BookFields>,
) -> Result<Reply<()>> {
    let mut book = Book::from_fields(fields);
    stamp_owner(&mut book, &identity);

    state.db.insert_book(&book)?;
    Ok(Reply::empty())
}

/// POST /book/update: update a catalog entry from submitted fields.
pub async fn book_update(
    State(state): State<AppState>,
    identity: Identity,
    Json(fields): Json<BookFields>,
) -> Result<Reply<()>> {
    let mut book = Book::from_fields(fields);
    stamp_owner(&mut book, &identity);

    state.db.update_book(&book)?;
    Ok(Reply::empty_msg("update succeeded"))
}

/// Never trust a client-supplied username when a verified token is present.
fn stamp_owner(book: &mut Book, identity: &Identity) {
    if let Some(username) = identity.username() {
        book.username = Some(username.to_string());
    }
}

/// Query carrying the catalog key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNameQuery {
    /// Catalog key of the book.
    #[serde(default)]
    pub file_name: String,
}

/// GET /book/get: fetch one catalog entry by `fileName`.
pub async fn book_get(
    State(state): State<AppState>,
    Query(query): Query<FileNameQuery>,
) -> Result<Reply<Book>> {
    if query.file_name.is_empty() {
        return Err(AppError::Validation("fileName must not be empty".into()));
    }

    let book = state
        .db
        .get_book(&query.file_name)?
        .ok_or_else(|| AppError::NotFound(query.file_name.clone()))?;

    Ok(Reply::ok(book))
}

/// GET /book/delete: remove one catalog entry by `fileName`.
pub async fn book_delete(
    State(state): State<AppState>,
    Query(query): Query<FileNameQuery>,
) -> Result<Reply<()>> {
    if query.file_name.is_empty() {
        return Err(AppError::Validation("fileName must not be empty".into()));
    }

    if !state.db.delete_book(&query.file_name)? {
        return Err(AppError::NotFound(query.file_name.clone()));
    }

    Ok(Reply::empty_msg("delete succeeded"))
}

/// List query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Page number, 1-based (default 1).
    pub page: Option<u32>,
    /// Rows per page (default 20).
    pub page_size: Option<u32>,
    /// Title substring filter.
    pub title: Option<String>,
    /// Author substring filter.
    pub author: Option<String>,
    /// Exact category filter.
    pub category: Option<i64>,
}

/// GET /book/list: paginated listing with optional filters.
pub async fn book_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Reply<Vec<Book>>> {
    let filter = ListFilter {
        title: query.title,
        author: query.author,
        category: query.category,
        page: query.page.unwrap_or(1).max(1),
        page_size: query.page_size.unwrap_or(20).max(1),
    };

    let (list, total) = state.db.list_books(&filter)?;

    Ok(Reply::paged(
        list,
        "fetched book list",
        PageInfo {
            page: filter.page,
            page_size: filter.page_size,
            total,
        },
    ))
}

/// GET /book/clear: remove every catalog entry.
pub async fn book_clear(State(state): State<AppState>) -> Result<Reply<()>> {
    state.db.clear_books()?;
    Ok(Reply::empty())
}

/// GET /book/category: category aggregation.
pub async fn book_category(State(state): State<AppState>) -> Result<Reply<Vec<CategoryCount>>> {
    let categories = state.db.categories()?;
    Ok(Reply::ok(categories))
}

/// GET /book/home: home-page aggregation.
pub async fn book_home(State(state): State<AppState>) -> Result<Reply<HomeData>> {
    let home = state.db.home()?;
    Ok(Reply::ok(home))
}

// ============================================================================
// EPIDEMIC STATS
// ============================================================================

/// GET /book/area: reshaped area statistics.
///
/// Three datasets are fetched and combined into one array: incr rows with
/// their counts nested under `incrVo`, then province rows carrying their
/// matching cities.
pub async fn stats_area(State(state): State<AppState>) -> Result<Reply<Vec<AreaEntry>>> {
    let incr = state.db.list_area_records()?;
    let provinces = state.db.list_province_records()?;
    let cities = state.db.list_city_records()?;

    Ok(Reply::ok(stats::build_area_list(incr, provinces, cities)))
}

/// GET /book/c_info: national daily statistics, passed through.
pub async fn stats_daily(State(state): State<AppState>) -> Result<Reply<Vec<DailyRecord>>> {
    let daily = state.db.list_daily_records()?;
    Ok(Reply::ok(daily))
}

// ============================================================================
// AUTH
// ============================================================================

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
    username: String,
}

/// POST /user/login: verify credentials and issue a session token.
pub async fn user_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Reply<LoginResponse>> {
    let (user, token) = state.auth.login(&req.username, &req.password)?;

    Ok(Reply::ok_msg(
        LoginResponse {
            token,
            username: user.username,
        },
        "login succeeded",
    ))
}

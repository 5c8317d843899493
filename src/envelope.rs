//! Uniform JSON reply envelope.
//!
//! Every route answers with the same shape: `code` 0 on success, -1 on an
//! app-level failure, plus `msg`, optional `data` and optional pagination
//! meta flattened into the top level. The envelope always renders at
//! HTTP 200; protocol-level errors go through [`crate::error::AppError`].

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Success marker for the `code` field.
pub const CODE_OK: i32 = 0;
/// Failure marker for the `code` field.
pub const CODE_FAIL: i32 = -1;

/// Pagination metadata carried by list replies.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page number (1-based).
    pub page: u32,
    /// Page size used for the query.
    pub page_size: u32,
    /// Total matching rows, 0 when the store reports no count.
    pub total: u64,
}

/// JSON reply envelope wrapping a payload, message and optional paging.
#[derive(Debug, Serialize)]
pub struct Reply<T: Serialize> {
    /// 0 for success, -1 for failure.
    pub code: i32,
    /// Human-readable message.
    pub msg: String,
    /// Payload, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Pagination meta, flattened into the envelope when present.
    #[serde(flatten)]
    pub page: Option<PageInfo>,
}

impl<T: Serialize> Reply<T> {
    /// Successful reply with a payload.
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            msg: String::new(),
            data: Some(data),
            page: None,
        }
    }

    /// Successful reply with a payload and message.
    pub fn ok_msg(data: T, msg: impl Into<String>) -> Self {
        Self {
            code: CODE_OK,
            msg: msg.into(),
            data: Some(data),
            page: None,
        }
    }

    /// Successful paged reply.
    pub fn paged(data: T, msg: impl Into<String>, page: PageInfo) -> Self {
        Self {
            code: CODE_OK,
            msg: msg.into(),
            data: Some(data),
            page: Some(page),
        }
    }

    /// App-level failure reply, still HTTP 200.
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_FAIL,
            msg: msg.into(),
            data: None,
            page: None,
        }
    }
}

impl Reply<()> {
    /// Successful reply with no payload.
    pub fn empty() -> Self {
        Self {
            code: CODE_OK,
            msg: String::new(),
            data: None,
            page: None,
        }
    }

    /// Successful reply with no payload but a message.
    pub fn empty_msg(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_OK,
            msg: msg.into(),
            data: None,
            page: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

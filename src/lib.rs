//! bookshelf-rs: an ebook catalog server.
//!
//! This crate provides an HTTP API for managing an ebook catalog:
//! uploading EPUB files, extracting their metadata, CRUD over catalog
//! entries, paginated listing, category and home-page aggregation.
//! It also serves the auxiliary epidemic-statistics endpoints kept for
//! compatibility with the original frontend.
//!
//! # Features
//!
//! - Multipart EPUB upload with metadata extraction
//! - Catalog CRUD with pagination and filtering
//! - Token authentication stamping ownership on create/update
//! - Uniform JSON reply envelope on every route
//! - SQLite-backed store, zero external services

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Authentication and user management.
pub mod auth;
/// Book entity and field payloads.
pub mod book;
/// Configuration and CLI.
pub mod config;
/// Database operations.
pub mod db;
/// JSON reply envelope.
pub mod envelope;
/// Error types.
pub mod error;
/// Book format parsers.
pub mod formats;
/// HTTP server.
pub mod server;
/// Epidemic statistics records and reshaping.
pub mod stats;


pub use config::{Cli, Command, Config};
pub use db::Database;
pub use envelope::Reply;
pub use error::{AppError, Result};
pub use server::AppState;

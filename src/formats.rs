//! Book format parsers.

/// EPUB metadata extraction.
pub mod epub;

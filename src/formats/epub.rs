//! EPUB format parser.
//!
//! Reads the archive's `mimetype` entry, locates the OPF document through
//! `META-INF/container.xml`, pulls the Dublin Core metadata plus cover href,
//! and walks `toc.ncx` navPoints into a flat contents list.

use crate::book::ContentItem;
use crate::error::{AppError, Result};
use roxmltree::Document;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Required content of the `mimetype` archive entry.
const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Metadata extracted from an EPUB file.
#[derive(Debug, Clone)]
pub struct EpubMeta {
    /// Book title from the OPF metadata.
    pub title: String,
    /// First creator entry, if any.
    pub author: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Language code.
    pub language: Option<String>,
    /// Cover image href from the manifest.
    pub cover: Option<String>,
    /// Path of the OPF root file inside the archive.
    pub root_file: String,
    /// Flattened toc.ncx navigation points.
    pub contents: Vec<ContentItem>,
}

/// Parse an EPUB file into [`EpubMeta`].
pub fn parse_epub(path: &Path) -> Result<EpubMeta> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    check_mimetype(&mut archive)?;

    let root_file = find_opf_path(&mut archive)?;
    let opf_content = read_entry(&mut archive, &root_file)?;
    let (title, author, publisher, language, cover, ncx_href) = parse_opf(&opf_content)?;

    let title = title.ok_or_else(|| AppError::Parse("ebook title is missing".into()))?;

    let mut contents = Vec::new();
    if let Some(ncx_href) = ncx_href {
        let ncx_path = resolve_href(&root_file, &ncx_href);
        if let Ok(ncx_content) = read_entry(&mut archive, &ncx_path) {
            contents = parse_ncx(&ncx_content)?;
        }
    }

    Ok(EpubMeta {
        title,
        author,
        publisher,
        language,
        cover,
        root_file,
        contents,
    })
}

/// Verify the `mimetype` entry marks this archive as an EPUB.
fn check_mimetype(archive: &mut ZipArchive<File>) -> Result<()> {
    let mut entry = archive
        .by_name("mimetype")
        .map_err(|_| AppError::Parse("missing mimetype entry".into()))?;

    let mut content = String::new();
    entry.read_to_string(&mut content)?;

    if content.trim() != EPUB_MIMETYPE {
        return Err(AppError::Parse(format!(
            "unexpected mimetype: {}",
            content.trim()
        )));
    }
    Ok(())
}

/// Find the OPF file path from container.xml.
fn find_opf_path(archive: &mut ZipArchive<File>) -> Result<String> {
    let content = read_entry(archive, "META-INF/container.xml")?;
    let doc = Document::parse(&content)?;

    doc.descendants()
        .find(|n| n.has_tag_name("rootfile"))
        .and_then(|n| n.attribute("full-path"))
        .map(String::from)
        .ok_or_else(|| AppError::Parse("no rootfile in container.xml".into()))
}

/// Read a named archive entry into a string.
fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| AppError::Parse(format!("missing archive entry: {}", name)))?;

    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

type OpfFields = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Parse the OPF file: (title, author, publisher, language, cover href, ncx href).
fn parse_opf(content: &str) -> Result<OpfFields> {
    let doc = Document::parse(content)?;

    let mut title = None;
    let mut author = None;
    let mut publisher = None;
    let mut language = None;
    let mut cover_id: Option<String> = None;

    for node in doc.descendants() {
        match node.tag_name().name() {
            "title" => {
                if let Some(text) = node.text() {
                    title = Some(text.trim().to_string());
                }
            }
            "creator" => {
                if author.is_none()
                    && let Some(text) = node.text()
                {
                    author = Some(text.trim().to_string());
                }
            }
            "publisher" => {
                if let Some(text) = node.text() {
                    publisher = Some(text.trim().to_string());
                }
            }
            "language" => {
                if let Some(text) = node.text() {
                    language = Some(text.trim().to_string());
                }
            }
            "meta" => {
                if node.attribute("name") == Some("cover") {
                    cover_id = node.attribute("content").map(String::from);
                }
            }
            _ => {}
        }
    }

    let mut cover = None;
    let mut ncx_href = None;

    // Resolve cover id and locate the NCX in the manifest
    for node in doc.descendants() {
        if node.tag_name().name() != "item" {
            continue;
        }
        if let (Some(id), Some(href)) = (&cover_id, node.attribute("href"))
            && node.attribute("id") == Some(id.as_str())
        {
            cover = Some(href.to_string());
        }
        if node.attribute("media-type") == Some("application/x-dtbncx+xml") {
            ncx_href = node.attribute("href").map(String::from);
        }
    }

    Ok((title, author, publisher, language, cover, ncx_href))
}

/// Parse toc.ncx navPoints into a flat contents list, document order.
fn parse_ncx(content: &str) -> Result<Vec<ContentItem>> {
    let doc = Document::parse(content)?;
    let mut items = Vec::new();

    for node in doc.descendants().filter(|n| n.has_tag_name("navPoint")) {
        let nav_id = node.attribute("id").unwrap_or_default().to_string();
        let play_order = node
            .attribute("playOrder")
            .and_then(|p| p.parse().ok())
            .unwrap_or(items.len() as i64 + 1);

        let label = node
            .descendants()
            .find(|n| n.has_tag_name("text"))
            .and_then(|n| n.text())
            .unwrap_or_default()
            .trim()
            .to_string();

        let href = node
            .descendants()
            .find(|n| n.has_tag_name("content"))
            .and_then(|n| n.attribute("src"))
            .unwrap_or_default()
            .to_string();

        items.push(ContentItem {
            nav_id,
            label,
            href,
            play_order,
        });
    }

    Ok(items)
}

/// Resolve an href relative to the OPF file's directory.
fn resolve_href(opf_path: &str, href: &str) -> String {
    match opf_path.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, href),
        None => href.to_string(),
    }
}

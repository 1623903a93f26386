//! Directory listing module
//!
//! Scans the PDF library directory and produces the JSON listing served
//! at the listing endpoint. Entries are recomputed on every request;
//! nothing is cached between requests.

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::io;

use crate::config::LibraryConfig;
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;

/// One listed PDF file
///
/// Serialized field names (`Name`, `Size`, `ModTime`, `URL`) are part of
/// the wire format consumed by the frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PdfEntry {
    pub name: String,
    pub size: u64,
    pub mod_time: DateTime<Utc>,
    #[serde(rename = "URL")]
    pub url: String,
}

/// Serve the listing endpoint
///
/// A directory-read failure is a 500 with a generic body; the cause only
/// goes to the error log.
pub async fn serve_listing(
    ctx: &RequestContext<'_>,
    library: &LibraryConfig,
) -> Response<Full<Bytes>> {
    match scan_directory(&library.dir, &library.file_prefix).await {
        Ok(entries) => {
            if ctx.access_log {
                logger::log_listing_served(entries.len());
            }
            http::build_json_response(StatusCode::OK, &entries, ctx.is_head)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read pdf directory '{}': {e}",
                library.dir
            ));
            http::build_listing_error_response("failed to read pdf directory")
        }
    }
}

/// Scan `dir` for regular `.pdf` files and build their entries
///
/// Skips subdirectories, non-`.pdf` names (case-sensitive suffix match)
/// and non-UTF-8 names. A metadata failure on an individual file skips
/// that file only; the scan continues. Entries are sorted by name so the
/// listing is deterministic regardless of directory enumeration order.
pub async fn scan_directory(dir: &str, url_prefix: &str) -> io::Result<Vec<PdfEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            logger::log_warning(&format!(
                "Skipping non-UTF-8 file name: {file_name:?}"
            ));
            continue;
        };

        if !name.ends_with(".pdf") {
            continue;
        }

        // A directory named "something.pdf" is still a directory
        let file_type = match entry.file_type().await {
            Ok(t) => t,
            Err(e) => {
                logger::log_warning(&format!("Failed to read file type of '{name}': {e}"));
                continue;
            }
        };
        if file_type.is_dir() {
            continue;
        }

        // Follows symlinks, so a dangling link fails here and is skipped
        let metadata = match tokio::fs::metadata(entry.path()).await {
            Ok(m) => m,
            Err(e) => {
                logger::log_warning(&format!("Failed to stat '{name}': {e}"));
                continue;
            }
        };

        let mod_time = match metadata.modified() {
            Ok(t) => DateTime::<Utc>::from(t),
            Err(e) => {
                logger::log_warning(&format!("No modification time for '{name}': {e}"));
                continue;
            }
        };

        entries.push(PdfEntry {
            name: name.to_string(),
            size: metadata.len(),
            mod_time,
            url: format!("{url_prefix}{name}"),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &std::path::Path, name: &str, content: &[u8]) {
        fs::write(dir.join(name), content).expect("write test file");
    }

    #[tokio::test]
    async fn test_filters_to_pdf_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        touch(tmp.path(), "a.pdf", b"%PDF-1.4 a");
        touch(tmp.path(), "b.pdf", b"%PDF-1.4 bb");
        touch(tmp.path(), "notes.txt", b"not a pdf");

        let entries = scan_directory(tmp.path().to_str().unwrap(), "/pdfs/")
            .await
            .expect("scan");
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_excludes_directory_named_like_pdf() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(tmp.path().join("sub.pdf")).expect("mkdir");
        touch(tmp.path(), "real.pdf", b"%PDF-1.4");

        let entries = scan_directory(tmp.path().to_str().unwrap(), "/pdfs/")
            .await
            .expect("scan");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "real.pdf");
    }

    #[tokio::test]
    async fn test_empty_directory_yields_empty_listing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let entries = scan_directory(tmp.path().to_str().unwrap(), "/pdfs/")
            .await
            .expect("scan");
        assert!(entries.is_empty());
        assert_eq!(serde_json::to_string(&entries).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let result = scan_directory("/definitely/not/a/real/dir", "/pdfs/").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_directory_500_includes_cors() {
        let ctx = RequestContext {
            path: "/api/pdfs",
            is_head: false,
            access_log: false,
        };
        let library = LibraryConfig {
            dir: "/definitely/not/a/real/dir".to_string(),
            listing_path: "/api/pdfs".to_string(),
            file_prefix: "/pdfs/".to_string(),
        };

        let resp = serve_listing(&ctx, &library).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_entry_skipped_scan_continues() {
        let tmp = tempfile::tempdir().expect("tempdir");
        touch(tmp.path(), "good.pdf", b"%PDF-1.4");
        // Dangling symlink: the metadata query fails for this entry only
        std::os::unix::fs::symlink(tmp.path().join("gone.pdf"), tmp.path().join("broken.pdf"))
            .expect("symlink");

        let entries = scan_directory(tmp.path().to_str().unwrap(), "/pdfs/")
            .await
            .expect("scan");
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["good.pdf"]);
    }

    #[tokio::test]
    async fn test_entry_fields() {
        let tmp = tempfile::tempdir().expect("tempdir");
        touch(tmp.path(), "report.pdf", b"12345");

        let entries = scan_directory(tmp.path().to_str().unwrap(), "/pdfs/")
            .await
            .expect("scan");
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.name, "report.pdf");
        assert_eq!(entry.size, 5);
        assert_eq!(entry.url, "/pdfs/report.pdf");
        // Modification time is recent
        assert!(Utc::now().signed_duration_since(entry.mod_time).num_minutes() < 5);
    }

    #[tokio::test]
    async fn test_sorted_by_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        touch(tmp.path(), "zeta.pdf", b"z");
        touch(tmp.path(), "alpha.pdf", b"a");
        touch(tmp.path(), "mid.pdf", b"m");

        let entries = scan_directory(tmp.path().to_str().unwrap(), "/pdfs/")
            .await
            .expect("scan");
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha.pdf", "mid.pdf", "zeta.pdf"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let entry = PdfEntry {
            name: "a.pdf".to_string(),
            size: 3,
            mod_time: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            url: "/pdfs/a.pdf".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&entry).unwrap()).unwrap();
        assert_eq!(json["Name"], "a.pdf");
        assert_eq!(json["Size"], 3);
        assert_eq!(json["URL"], "/pdfs/a.pdf");
        assert!(json["ModTime"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }
}

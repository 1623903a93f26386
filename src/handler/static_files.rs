//! Static file serving module
//!
//! Serves raw file bytes from the library directory by name. No `.pdf`
//! filter applies here; any file in the directory is servable. Directory
//! requests and anything resolving outside the library are a 404.

use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve a file from the library directory
pub async fn serve_from_library(
    ctx: &RequestContext<'_>,
    dir: &str,
    route_prefix: &str,
) -> Response<Full<Bytes>> {
    match load_from_directory(dir, ctx.path, route_prefix).await {
        Some((content, content_type)) => {
            if ctx.access_log {
                logger::log_response(content.len());
            }
            http::build_file_response(content, content_type, ctx.is_head)
        }
        None => http::build_404_response(),
    }
}

/// Resolve a request path against the library directory and read the file
///
/// Returns `None` for anything that should be a 404: missing files,
/// directory requests, and paths escaping the library directory.
pub async fn load_from_directory(
    dir: &str,
    path: &str,
    route_prefix: &str,
) -> Option<(Vec<u8>, &'static str)> {
    let Some(file_path) = resolve_path(dir, path, route_prefix) else {
        logger::log_warning(&format!("Rejected file request path: {path}"));
        return None;
    };

    // Security: ensure file_path is within the library directory
    let dir_canonical = match Path::new(dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Library directory not found or inaccessible '{dir}': {e}"
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_path_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }

    // No directory listing through this path
    if file_path_canonical.is_dir() {
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path_canonical.display(),
                e
            ));
            return None;
        }
    };

    let content_type =
        mime::get_content_type(file_path_canonical.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Strip the route prefix, percent-decode, and join onto the library directory
///
/// Clients request listed names percent-encoded (`my%20file.pdf`), so the
/// remainder is decoded before resolution. Returns `None` for undecodable
/// paths and for any path containing a `..` segment; the canonicalization
/// containment check in `load_from_directory` is the backstop.
fn resolve_path(dir: &str, path: &str, route_prefix: &str) -> Option<PathBuf> {
    let clean_path = path.trim_start_matches('/');

    let prefix_clean = route_prefix.trim_matches('/');
    let relative_path = if prefix_clean.is_empty() {
        clean_path
    } else {
        clean_path
            .strip_prefix(&format!("{prefix_clean}/"))
            .unwrap_or(clean_path)
    };

    let decoded = percent_decode_str(relative_path).decode_utf8().ok()?;

    if decoded.split('/').any(|segment| segment == "..") {
        return None;
    }

    Some(Path::new(dir).join(decoded.as_ref()))
}

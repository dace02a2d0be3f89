//! Static bootstrap content server.
//!
//! Serves the login/bootstrap files (the pages that let a browser acquire a
//! ticket before it can authenticate) from a configured root directory.
//! Resolution is purely lexical and refuses to escape the root; files are
//! streamed chunk-wise rather than buffered.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use http_body_util::StreamBody;
use tokio_util::io::ReaderStream;

use crate::body::{self, Body};

const INDEX_FILE: &str = "index.html";

/// Resolve a request path remainder against the bootstrap root.
///
/// Returns `None` when the path would escape the root (any `..` above it);
/// such paths are rejected outright rather than probed on disk. A final
/// segment without an extension separator resolves to the directory's
/// `index.html`, so `/login/` serves `<root>/index.html`.
pub fn resolve(root: &Path, remainder: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in remainder.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(segment),
        }
    }

    let mut path = root.to_path_buf();
    path.extend(&segments);
    // Judge the raw final segment, before empties are discarded: a
    // trailing slash is a directory request even when the segment before
    // it looks like a file name.
    if !remainder.rsplit('/').next().is_some_and(|s| s.contains('.')) {
        path.push(INDEX_FILE);
    }
    Some(path)
}

/// Serve a resolved bootstrap path, streaming the file body.
///
/// `None` (a rejected path) and missing files both produce the plain 404;
/// the client cannot distinguish a traversal attempt from a typo.
pub(crate) async fn serve(path: Option<PathBuf>) -> Response<Body> {
    let path = match path {
        Some(path) => path,
        None => return not_found(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return not_found(),
        Err(e) => {
            log::warn!("failed to open bootstrap file {}: {e}", path.display());
            return internal_error();
        }
    };

    match file.metadata().await {
        Ok(metadata) if metadata.is_dir() => return not_found(),
        Ok(_) => {}
        Err(e) => {
            log::warn!("failed to stat bootstrap file {}: {e}", path.display());
            return internal_error();
        }
    }

    let content_type = mime_guess::from_path(&path).first_or_text_plain();
    let content_type = HeaderValue::from_str(content_type.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("text/plain"));

    // The file handle lives inside the stream and is released when the
    // response body is fully sent or the connection goes away.
    let stream = ReaderStream::new(file)
        .map_ok(http_body::Frame::data)
        .map_err(|e| Box::new(e) as crate::body::BoxError);
    let mut response = Response::new(body::boxed(StreamBody::new(stream)));
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

fn not_found() -> Response<Body> {
    let mut response = Response::new(body::full(Bytes::from_static(b"not found")));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(mime::TEXT_PLAIN.as_ref()),
    );
    response
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty_remainder_serves_index() {
        let path = resolve(Path::new("/srv/login"), "").unwrap();
        assert_eq!(path, Path::new("/srv/login/index.html"));
    }

    #[test]
    fn test_resolve_directory_request_appends_index() {
        let path = resolve(Path::new("/srv/login"), "setup/").unwrap();
        assert_eq!(path, Path::new("/srv/login/setup/index.html"));
    }

    #[test]
    fn test_resolve_file_with_extension_kept() {
        let path = resolve(Path::new("/srv/login"), "js/webgss.js").unwrap();
        assert_eq!(path, Path::new("/srv/login/js/webgss.js"));
    }

    #[test]
    fn test_resolve_trailing_slash_on_file_name_is_directory_request() {
        let path = resolve(Path::new("/srv/login"), "app.js/").unwrap();
        assert_eq!(path, Path::new("/srv/login/app.js/index.html"));
    }

    #[test]
    fn test_resolve_rejects_escape() {
        assert!(resolve(Path::new("/srv/login"), "../../etc/passwd").is_none());
        assert!(resolve(Path::new("/srv/login"), "a/../../etc/passwd").is_none());
    }

    #[test]
    fn test_resolve_allows_internal_dotdot() {
        let path = resolve(Path::new("/srv/login"), "a/b/../c.css").unwrap();
        assert_eq!(path, Path::new("/srv/login/a/c.css"));
    }

    #[test]
    fn test_resolve_ignores_dot_and_empty_segments() {
        let path = resolve(Path::new("/srv/login"), ".//./app.js").unwrap();
        assert_eq!(path, Path::new("/srv/login/app.js"));
    }
}

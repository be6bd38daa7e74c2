//! Request path resolution module
//!
//! Maps an incoming request path onto the document root with
//! single-page-application fallback semantics: real files win, directories
//! fall back to their index file, dotted basenames that match nothing are
//! misses, and everything else is handed to the client-side router via the
//! root index file.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Outcome of resolving a request path against the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// An existing regular file: a direct asset hit or a directory index.
    File(PathBuf),
    /// Nothing on disk matched and the path carries no extension; serve the
    /// document root's index file so the client-side router takes over.
    SpaFallback(PathBuf),
    /// An asset-like request (dotted basename) with no file on disk. The
    /// computed path is carried for logging only.
    NotFound(PathBuf),
}

/// Resolution failures that must not be treated as ordinary misses.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Percent-decoding produced invalid UTF-8.
    #[error("invalid percent-encoding in request path: {0}")]
    Decode(String),
    /// Normalization would climb above the document root.
    #[error("path traversal escapes document root: {0}")]
    Traversal(String),
}

/// Resolve a raw request path to a filesystem path under `document_root`.
///
/// Steps, in order: percent-decode, strip the query component, normalize
/// onto the document root, then probe the filesystem. Only read-only stat
/// calls are performed; file content is never touched here.
pub fn resolve(
    request_path: &str,
    document_root: &Path,
    index_file: &str,
) -> Result<Resolved, ResolveError> {
    let decoded = urlencoding::decode(request_path)
        .map_err(|_| ResolveError::Decode(request_path.to_string()))?;

    // Decoding runs first, so an encoded %3F also acts as a query separator.
    let path = decoded.split('?').next().unwrap_or("");

    let relative = sanitize(path)?;
    let candidate = document_root.join(relative);

    if candidate.is_file() {
        return Ok(Resolved::File(candidate));
    }

    if candidate.is_dir() {
        let index = candidate.join(index_file);
        if index.is_file() {
            return Ok(Resolved::File(index));
        }
    }

    // The extension check uses the path as the client wrote it (decoded,
    // query stripped), not the normalized form.
    if basename(path).contains('.') {
        return Ok(Resolved::NotFound(candidate));
    }

    Ok(Resolved::SpaFallback(document_root.join(index_file)))
}

/// Collapse `.`/`..` segments into a relative path that stays inside the
/// document root. A `..` with nothing left to pop escapes the served tree
/// and is rejected.
fn sanitize(path: &str) -> Result<PathBuf, ResolveError> {
    let mut clean = PathBuf::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => clean.push(segment),
            Component::ParentDir => {
                if !clean.pop() {
                    return Err(ResolveError::Traversal(path.to_string()));
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Ok(clean)
}

/// Final segment of the request path.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

//! Serves files below a root directory under a URL prefix.

use crate::Response;
use http::HeaderValue;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_STATIC_PREFIX: &str = "/static";

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    prefix: String,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), prefix: DEFAULT_STATIC_PREFIX.to_owned() }
    }

    /// Serves under `prefix` instead of `/static`.
    ///
    /// The prefix is normalized to one leading `/` and no trailing `/`, so `assets`,
    /// `/assets` and `/assets/` are the same prefix. A root prefix (`/` or empty)
    /// normalizes to `""`; [`StaticFiles::is_rooted`] reports it.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        self.prefix = if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") };
        self
    }

    /// Whether the prefix is the URL root, which would shadow every route
    pub fn is_rooted(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the file path below the root if `path` is under the prefix.
    ///
    /// The prefix must end at a segment boundary: with prefix `/static`,
    /// `/static/app.css` is a static path and `/staticky` is not.
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') { Some(rest.trim_start_matches('/')) } else { None }
    }

    /// Maps a relative file path onto the root, refusing anything that could leave it
    pub fn resolve(&self, file: &str) -> Option<PathBuf> {
        let file = Path::new(file);
        let mut components = file.components().peekable();
        components.peek()?;
        if components.all(|component| matches!(component, Component::Normal(_))) {
            Some(self.root.join(file))
        } else {
            None
        }
    }

    /// Reads `file` (relative to the root) into a response.
    ///
    /// Answers 404 when the file does not exist, is a directory, or lies outside the root.
    pub async fn serve(&self, file: &str) -> Response {
        let Some(path) = self.resolve(file) else {
            debug!(file, "refusing static path");
            return Response::not_found();
        };

        match read_file(&path).await {
            Ok(Some(contents)) => {
                let mime = mime_guess::from_path(&path).first_or_octet_stream();
                let content_type = HeaderValue::from_str(mime.as_ref())
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

                let mut resp = Response::new();
                resp.set_content_type(content_type);
                resp.set_body(contents);
                resp
            }
            Ok(None) => Response::not_found(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read static file");
                Response::not_found()
            }
        }
    }
}

async fn read_file(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => tokio::fs::read(path).await.map(Some),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::fs;

    fn static_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/main.css"), "body {background-color: red}").unwrap();
        dir
    }

    #[test]
    fn strip_respects_segment_boundary() {
        let files = StaticFiles::new("/srv");

        assert_eq!(files.strip("/static/css/main.css"), Some("css/main.css"));
        assert_eq!(files.strip("/static"), Some(""));
        assert_eq!(files.strip("/staticky"), None);
        assert_eq!(files.strip("/home"), None);

        let files = files.with_prefix("/assets/");
        assert_eq!(files.prefix(), "/assets");
        assert_eq!(files.strip("/assets/app.js"), Some("app.js"));
    }

    #[test]
    fn prefix_is_normalized() {
        let files = StaticFiles::new("/srv").with_prefix("assets");
        assert_eq!(files.prefix(), "/assets");
        assert_eq!(files.strip("/assets/app.js"), Some("app.js"));
        assert!(!files.is_rooted());

        assert_eq!(StaticFiles::new("/srv").with_prefix("//public/img//").prefix(), "/public/img");

        assert!(StaticFiles::new("/srv").with_prefix("/").is_rooted());
        assert!(StaticFiles::new("/srv").with_prefix("").is_rooted());
        assert!(!StaticFiles::new("/srv").is_rooted());
    }

    #[test]
    fn resolve_refuses_escapes() {
        let files = StaticFiles::new("/srv");

        assert_eq!(files.resolve("css/main.css"), Some(PathBuf::from("/srv/css/main.css")));
        assert_eq!(files.resolve("../etc/passwd"), None);
        assert_eq!(files.resolve("css/../../etc/passwd"), None);
        assert_eq!(files.resolve("/etc/passwd"), None);
        assert_eq!(files.resolve(""), None);
    }

    #[tokio::test]
    async fn serves_file_with_guessed_content_type() {
        let dir = static_dir();
        let files = StaticFiles::new(dir.path());

        let resp = files.serve("css/main.css").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.content_type(), Some("text/css"));
        assert_eq!(resp.text(), "body {background-color: red}");
    }

    #[tokio::test]
    async fn missing_file_and_directory_are_not_found() {
        let dir = static_dir();
        let files = StaticFiles::new(dir.path());

        assert_eq!(files.serve("main.css").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(files.serve("css").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(files.serve("../main.css").await.status(), StatusCode::NOT_FOUND);
    }
}

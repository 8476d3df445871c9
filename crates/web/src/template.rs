//! Template rendering on top of `tera`.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("application was built without a templates directory")]
    Misconfigured,

    #[error("template context must serialize to a map: {0}")]
    Context(#[source] tera::Error),

    #[error("failed to render template: {0}")]
    Render(#[from] tera::Error),
}

/// Every template found below a directory, loaded once.
///
/// Cheap to clone; clones share the same environment. Templates ending in `.html`,
/// `.htm` or `.xml` are auto-escaped.
#[derive(Clone, Debug)]
pub struct Templates {
    tera: Arc<Tera>,
    root: PathBuf,
}

impl Templates {
    /// Loads `<dir>/**/*`, template names are paths relative to `dir`
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let root = dir.as_ref().to_path_buf();
        let tera = Tera::new(&format!("{}/**/*", root.display()))?;
        Ok(Self { tera: Arc::new(tera), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|template| template == name)
    }

    pub fn render<C>(&self, name: &str, context: &C) -> Result<String, TemplateError>
    where
        C: Serialize + ?Sized,
    {
        let context = Context::from_serialize(context).map_err(TemplateError::Context)?;
        Ok(self.tera.render(name, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;

    fn templates() -> (tempfile::TempDir, Templates) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html><title>{{ title }}</title><h1>{{ name }}</h1></html>").unwrap();
        fs::create_dir(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("partials/greeting.txt"), "hi {{ name }}").unwrap();
        let templates = Templates::new(dir.path()).unwrap();
        (dir, templates)
    }

    #[test]
    fn renders_context_into_template() {
        let (_dir, templates) = templates();

        let html = templates.render("index.html", &json!({"title": "Test Title", "name": "Test Name"})).unwrap();

        assert!(html.contains("<title>Test Title</title>"));
        assert!(html.contains("<h1>Test Name</h1>"));
    }

    #[test]
    fn html_is_escaped_and_text_is_not() {
        let (_dir, templates) = templates();
        let context = HashMap::from([("title", "a"), ("name", "<b>")]);

        assert!(templates.render("index.html", &context).unwrap().contains("&lt;b&gt;"));
        assert_eq!(templates.render("partials/greeting.txt", &context).unwrap(), "hi <b>");
        assert!(templates.contains("partials/greeting.txt"));
    }

    #[test]
    fn context_must_be_a_map() {
        let (_dir, templates) = templates();

        let error = templates.render("index.html", &42).unwrap_err();
        assert!(matches!(error, TemplateError::Context(_)));
    }

    #[test]
    fn unknown_template_fails_to_render() {
        let (_dir, templates) = templates();

        let error = templates.render("missing.html", &json!({})).unwrap_err();
        assert!(matches!(error, TemplateError::Render(_)));
    }
}

mod pattern;

pub use pattern::PathPattern;

use crate::error::RegistrationError;
use crate::request::PathParams;
use crate::view::View;
use tracing::trace;

/// The route table: patterns and their views, in registration order.
///
/// Matching is first-match-wins, not best-match: when two patterns can both parse a
/// path, the one registered first is returned. Routes are only added while the
/// application is being built, the table is read-only afterwards.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

/// A pattern bound to a view
#[derive(Debug)]
pub struct Route {
    pattern: PathPattern,
    view: View,
}

/// Result of matching a path: the route and the typed placeholder bindings
#[derive(Debug)]
pub struct RouteMatch<'router> {
    route: &'router Route,
    params: PathParams,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers `view` under `pattern`.
    ///
    /// Fails without inserting anything if the exact pattern string is already
    /// registered, or if the pattern is malformed.
    pub fn add(&mut self, pattern: &str, view: impl Into<View>) -> Result<(), RegistrationError> {
        let view = view.into();

        if let Some(existing) = self.routes.iter().find(|route| route.pattern.as_str() == pattern) {
            return Err(RegistrationError::RouteConflict {
                pattern: pattern.to_owned(),
                existing: existing.view.name(),
                new: view.name(),
            });
        }

        let pattern = PathPattern::parse(pattern)?;
        self.routes.push(Route { pattern, view });
        Ok(())
    }

    /// Matches a path against the registered patterns, in registration order
    pub fn at(&self, path: &str) -> Option<RouteMatch<'_>> {
        let matched = self
            .routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| RouteMatch { route, params }));

        if matched.is_none() {
            trace!(path, "no pattern matched");
        }
        matched
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Route {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn view(&self) -> &View {
        &self.view
    }
}

impl<'router> RouteMatch<'router> {
    pub fn route(&self) -> &'router Route {
        self.route
    }

    pub fn view(&self) -> &'router View {
        &self.route.view
    }

    /// Gets the path parameters from the matched route
    pub fn params(&self) -> &PathParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::Router;
    use crate::error::RegistrationError;
    use crate::view::{view_fn, ViewResult};
    use crate::{PathParams, Request, Response};

    async fn greeting(_req: &Request, resp: &mut Response, params: &PathParams) -> ViewResult {
        resp.set_text(format!("Hi {}", params.str("name").unwrap_or_default()));
        Ok(())
    }

    async fn about(_req: &Request, resp: &mut Response, _params: &PathParams) -> ViewResult {
        resp.set_text("about");
        Ok(())
    }

    fn router() -> Router {
        let mut router = Router::new();
        router.add("/{name}", view_fn(greeting)).unwrap();
        router.add("/about", view_fn(about)).unwrap();
        router.add("/add/{a:int}/{b:int}", view_fn(about)).unwrap();
        router
    }

    #[test]
    fn first_registered_pattern_wins() {
        let router = router();
        let matched = router.at("/about").unwrap();

        assert_eq!(matched.route().pattern(), "/{name}");
        assert_eq!(matched.params().str("name"), Some("about"));
    }

    #[test]
    fn registration_order_decides_overlaps() {
        let mut router = Router::new();
        router.add("/about", view_fn(about)).unwrap();
        router.add("/{name}", view_fn(greeting)).unwrap();

        assert_eq!(router.at("/about").unwrap().route().pattern(), "/about");
        assert_eq!(router.at("/matthew").unwrap().route().pattern(), "/{name}");
    }

    #[test]
    fn typed_bindings() {
        let router = router();
        let matched = router.at("/add/3/4").unwrap();

        assert_eq!(matched.route().pattern(), "/add/{a:int}/{b:int}");
        assert_eq!(matched.params().int("a"), Some(3));
        assert_eq!(matched.params().int("b"), Some(4));
    }

    #[test]
    fn no_match() {
        let router = router();
        assert!(router.at("/add/3").is_none());
        assert!(router.at("/").is_none());
    }

    #[test]
    fn matching_is_idempotent() {
        let router = router();
        let first = router.at("/add/3/4").unwrap();
        let second = router.at("/add/3/4").unwrap();

        assert!(std::ptr::eq(first.route(), second.route()));
        assert_eq!(first.params(), second.params());
    }

    #[test]
    fn duplicate_pattern_is_rejected() {
        let mut router = router();
        let error = router.add("/about", view_fn(greeting)).unwrap_err();

        match error {
            RegistrationError::RouteConflict { pattern, existing, new } => {
                assert_eq!(pattern, "/about");
                assert!(existing.ends_with("about"));
                assert!(new.ends_with("greeting"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(router.len(), 3);
    }

    #[test]
    fn same_view_twice_is_still_a_conflict() {
        let mut router = Router::new();
        router.add("/home", view_fn(about)).unwrap();
        assert!(router.add("/home", view_fn(about)).unwrap_err().is_conflict());
    }

    #[test]
    fn invalid_pattern_is_not_inserted() {
        let mut router = Router::new();
        assert!(router.add("/{broken", view_fn(about)).is_err());
        assert!(router.is_empty());
    }
}

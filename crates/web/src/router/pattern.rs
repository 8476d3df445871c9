//! Route pattern grammar.
//!
//! A pattern is literal text with named placeholders:
//!
//! | placeholder                     | matches                         | binds as |
//! |---------------------------------|---------------------------------|----------|
//! | `{name}`, `{name:s}`, `{name:str}` | one or more non-`/` characters | `Str`    |
//! | `{name:d}`, `{name:int}`        | one or more ascii digits        | `Int`    |
//! | `{name:f}`, `{name:float}`      | a decimal number, e.g. `1.5`    | `Float`  |
//! | `{name:path}`                   | the rest of the path, `/` included | `Str` |
//!
//! `{{` and `}}` stand for literal braces. Any other `{` or `}` outside a
//! placeholder is rejected.
//!
//! Patterns compile to an anchored regex, so a pattern only matches the whole path.

use crate::error::RegistrationError;
use crate::request::{ParamValue, PathParams};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    Str,
    Int,
    Float,
    Path,
}

impl ParamKind {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "" | "s" | "str" => Some(ParamKind::Str),
            "d" | "int" => Some(ParamKind::Int),
            "f" | "float" => Some(ParamKind::Float),
            "path" => Some(ParamKind::Path),
            _ => None,
        }
    }

    fn regex(self) -> &'static str {
        match self {
            ParamKind::Str => "([^/]+)",
            ParamKind::Int => "([0-9]+)",
            ParamKind::Float => r"([0-9]+(?:\.[0-9]+)?|\.[0-9]+)",
            ParamKind::Path => "(.+)",
        }
    }

    /// Converts the captured text, `None` when it does not fit the type (e.g. an
    /// integer overflowing `i64`).
    fn convert(self, text: &str) -> Option<ParamValue> {
        match self {
            ParamKind::Str | ParamKind::Path => Some(ParamValue::Str(text.to_owned())),
            ParamKind::Int => text.parse().ok().map(ParamValue::Int),
            ParamKind::Float => text.parse().ok().map(ParamValue::Float),
        }
    }
}

#[derive(Debug, Clone)]
struct Placeholder {
    name: String,
    kind: ParamKind,
}

impl Placeholder {
    /// Parses the text between the braces, `name` or `name:code`
    fn parse(raw: &str, inner: &str, seen: &[Placeholder]) -> Result<Self, RegistrationError> {
        let (name, code) = inner.split_once(':').unwrap_or((inner, ""));
        let name = name.trim();
        if !IDENTIFIER.is_match(name) {
            return Err(RegistrationError::invalid_pattern(raw, format!("invalid placeholder name `{name}`")));
        }
        if seen.iter().any(|placeholder| placeholder.name == name) {
            return Err(RegistrationError::invalid_pattern(raw, format!("duplicate placeholder `{name}`")));
        }
        let kind = ParamKind::from_code(code.trim())
            .ok_or_else(|| RegistrationError::invalid_pattern(raw, format!("unknown type code `{code}`")))?;

        Ok(Self { name: name.to_owned(), kind })
    }
}

/// A compiled route pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    regex: Regex,
    placeholders: Vec<Placeholder>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, RegistrationError> {
        let mut expression = String::with_capacity(raw.len() * 2);
        let mut placeholders: Vec<Placeholder> = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        expression.push('^');
        while let Some(at) = rest.find(['{', '}']) {
            literal.push_str(&rest[..at]);
            let tail = &rest[at..];

            if let Some(after) = tail.strip_prefix("{{") {
                literal.push('{');
                rest = after;
                continue;
            }
            if let Some(after) = tail.strip_prefix("}}") {
                literal.push('}');
                rest = after;
                continue;
            }

            let body = tail.strip_prefix('{').ok_or_else(|| unbalanced(raw))?;
            let end = body.find(['{', '}']).filter(|&end| body[end..].starts_with('}')).ok_or_else(|| unbalanced(raw))?;
            let placeholder = Placeholder::parse(raw, &body[..end], &placeholders)?;

            expression.push_str(&regex::escape(&literal));
            literal.clear();
            expression.push_str(placeholder.kind.regex());
            placeholders.push(placeholder);
            rest = &body[end + 1..];
        }
        literal.push_str(rest);
        expression.push_str(&regex::escape(&literal));
        expression.push('$');

        let regex = Regex::new(&expression).map_err(|e| RegistrationError::invalid_pattern(raw, e))?;
        Ok(Self { raw: raw.to_owned(), regex, placeholders })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches the whole `path`, returning the typed bindings on success
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let captures = self.regex.captures(path)?;
        let mut params = PathParams::with_capacity(self.placeholders.len());

        for (index, placeholder) in self.placeholders.iter().enumerate() {
            let text = captures.get(index + 1)?.as_str();
            params.push(placeholder.name.as_str(), placeholder.kind.convert(text)?);
        }

        Some(params)
    }
}

fn unbalanced(raw: &str) -> RegistrationError {
    RegistrationError::invalid_pattern(raw, "unbalanced brace")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> PathPattern {
        PathPattern::parse(raw).unwrap()
    }

    #[test]
    fn literal_pattern() {
        let pattern = pattern("/about");

        assert!(pattern.matches("/about").unwrap().is_empty());
        assert!(pattern.matches("/about/").is_none());
        assert!(pattern.matches("/abou").is_none());
    }

    #[test]
    fn literal_text_is_escaped() {
        let pattern = pattern("/file.txt");

        assert!(pattern.matches("/file.txt").is_some());
        assert!(pattern.matches("/fileXtxt").is_none());
    }

    #[test]
    fn untyped_placeholder_is_a_string() {
        let params = pattern("/hello/{name}").matches("/hello/ashley").unwrap();

        assert_eq!(params.get("name"), Some(&ParamValue::Str("ashley".into())));
        assert!(pattern("/hello/{name}").matches("/hello/ash/ley").is_none());
        assert!(pattern("/hello/{name}").matches("/hello/").is_none());
    }

    #[test]
    fn int_placeholders() {
        let params = pattern("/add/{a:int}/{b:d}").matches("/add/3/4").unwrap();

        assert_eq!(params.int("a"), Some(3));
        assert_eq!(params.int("b"), Some(4));
        assert!(pattern("/add/{a:int}/{b:d}").matches("/add/x/4").is_none());
    }

    #[test]
    fn int_overflow_does_not_match() {
        assert!(pattern("/{n:int}").matches("/99999999999999999999999").is_none());
    }

    #[test]
    fn float_and_path_placeholders() {
        let params = pattern("/scale/{factor:float}/{rest:path}").matches("/scale/1.5/a/b.css").unwrap();

        assert_eq!(params.float("factor"), Some(1.5));
        assert_eq!(params.str("rest"), Some("a/b.css"));
    }

    #[test]
    fn placeholder_inside_segment() {
        let params = pattern("/v{version:int}/items").matches("/v2/items").unwrap();
        assert_eq!(params.int("version"), Some(2));
    }

    #[test]
    fn doubled_braces_are_literal() {
        let escaped = pattern("/{{raw}}/{id:int}");

        assert_eq!(escaped.matches("/{raw}/5").unwrap().int("id"), Some(5));
        assert!(escaped.matches("/raw/5").is_none());

        let params = pattern("/{{{name}}}").matches("/{ash}").unwrap();
        assert_eq!(params.str("name"), Some("ash"));
    }

    #[test]
    fn invalid_patterns() {
        for raw in ["/{", "/}", "/{}", "/{a}/{a}", "/{a:uuid}", "/{1a}", "/{a b}", "/{a{b}}", "/{a}}", "/x}"] {
            let error = PathPattern::parse(raw).unwrap_err();
            assert!(matches!(error, RegistrationError::InvalidPattern { .. }), "{raw} should be invalid");
        }
    }
}

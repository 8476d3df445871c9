//! Error types shared by the dispatcher and the registration APIs.
//!
//! Two families live here:
//! - setup-time failures ([`RegistrationError`]), returned while routes and error
//!   handlers are being registered
//! - runtime failures ([`ViewError`]), returned by views and either recovered by a
//!   registered error handler or propagated out of the dispatcher unchanged

use http::Method;
use std::any::{type_name, TypeId};
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Identifies the concrete type of a view failure.
///
/// Error handlers are keyed by category, and lookup only succeeds on an exact match:
/// a handler registered for one error type never receives a different type.
#[derive(Clone, Copy)]
pub struct ErrorCategory {
    id: TypeId,
    name: &'static str,
}

impl ErrorCategory {
    /// The category of errors of type `E`.
    pub fn of<E: 'static>() -> Self {
        Self { id: TypeId::of::<E>(), name: type_name::<E>() }
    }

    /// The full type path of the error type, e.g. `sixi_web::MethodNotAllowed`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ErrorCategory {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ErrorCategory {}

impl Hash for ErrorCategory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorCategory").field(&self.name).finish()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A failure raised by a view, tagged with the category of the original error.
///
/// Any `E: Error + Send + Sync + 'static` converts into a `ViewError`, so views can
/// use `?` on their own error types. `ViewError` deliberately does not implement
/// [`std::error::Error`] itself, otherwise that blanket conversion would overlap
/// with `From<T> for T`.
pub struct ViewError {
    category: ErrorCategory,
    inner: Box<dyn Error + Send + Sync>,
}

impl ViewError {
    pub fn new<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self { category: ErrorCategory::of::<E>(), inner: Box::new(error) }
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Returns true if the wrapped error is of type `E`.
    pub fn is<E: Error + 'static>(&self) -> bool {
        self.inner.is::<E>()
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    pub fn into_inner(self) -> Box<dyn Error + Send + Sync> {
        self.inner
    }
}

impl<E> From<E> for ViewError
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        ViewError::new(error)
    }
}

impl From<ViewError> for Box<dyn Error + Send + Sync> {
    fn from(error: ViewError) -> Self {
        error.inner
    }
}

impl fmt::Debug for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewError").field("category", &self.category.name).field("source", &self.inner).finish()
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// Raised when a matched route cannot serve the request method.
///
/// It travels through the error handler registry like any other view failure, so an
/// application can turn it into a 405 by registering a handler for this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("method not allowed: {method}")]
pub struct MethodNotAllowed {
    method: Method,
    allowed: Vec<Method>,
}

impl MethodNotAllowed {
    pub fn new(method: Method, allowed: Vec<Method>) -> Self {
        Self { method, allowed }
    }

    /// The rejected request method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The methods the matched view does serve
    pub fn allowed(&self) -> &[Method] {
        &self.allowed
    }
}

/// Setup-time failures. Nothing is inserted when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("cannot add route `{pattern}`, conflicting views:\n- {existing}\n- {new}")]
    RouteConflict { pattern: String, existing: &'static str, new: &'static str },

    #[error("cannot add error handler for `{category}`, conflicting handlers:\n- {existing}\n- {new}")]
    ErrorHandlerConflict { category: &'static str, existing: &'static str, new: &'static str },

    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl RegistrationError {
    pub fn invalid_pattern<S: ToString>(pattern: &str, reason: S) -> Self {
        Self::InvalidPattern { pattern: pattern.to_owned(), reason: reason.to_string() }
    }

    /// Returns true for duplicate route or duplicate error handler registrations.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RouteConflict { .. } | Self::ErrorHandlerConflict { .. })
    }
}

//! Registry of user recovery callbacks, keyed by error category.
//!
//! Lookup is by exact category: a handler for `E` only ever sees errors whose
//! concrete type is `E`, there is no fallback to a more general handler.

use crate::error::{ErrorCategory, RegistrationError, ViewError};
use crate::{Request, Response};
use std::any::type_name;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

type ErasedHandler = Box<dyn Fn(&Request, &mut Response, &ViewError) + Send + Sync>;

/// A registered recovery callback
pub struct ErrorHandler {
    name: &'static str,
    handler: ErasedHandler,
}

impl ErrorHandler {
    /// The type path of the registered callback
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, req: &Request, resp: &mut Response, error: &ViewError) {
        (self.handler)(req, resp, error);
    }
}

#[derive(Default)]
pub struct ErrorHandlers {
    handlers: HashMap<ErrorCategory, ErrorHandler>,
}

impl ErrorHandlers {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Registers `handler` for errors of type `E`.
    ///
    /// Fails with [`RegistrationError::ErrorHandlerConflict`] when `E` already has a
    /// handler; the existing one stays in place.
    pub fn register<E, H>(&mut self, handler: H) -> Result<(), RegistrationError>
    where
        E: Error + Send + Sync + 'static,
        H: Fn(&Request, &mut Response, &E) + Send + Sync + 'static,
    {
        let category = ErrorCategory::of::<E>();
        let name = type_name::<H>();

        if let Some(existing) = self.handlers.get(&category) {
            return Err(RegistrationError::ErrorHandlerConflict { category: category.name(), existing: existing.name, new: name });
        }

        let handler: ErasedHandler = Box::new(move |req, resp, error| {
            if let Some(error) = error.downcast_ref::<E>() {
                handler(req, resp, error);
            }
        });
        self.handlers.insert(category, ErrorHandler { name, handler });
        Ok(())
    }

    pub fn lookup(&self, category: ErrorCategory) -> Option<&ErrorHandler> {
        self.handlers.get(&category)
    }

    pub fn contains<E: 'static>(&self) -> bool {
        self.handlers.contains_key(&ErrorCategory::of::<E>())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler").field("name", &self.name).finish()
    }
}

impl fmt::Debug for ErrorHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.handlers.iter().map(|(category, handler)| (category.name(), handler.name))).finish()
    }
}

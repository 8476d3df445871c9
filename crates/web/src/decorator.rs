//! Decorators turn one value into a wrapped version of itself.
//!
//! The middleware chain is built from them: every decorator receives the current
//! outermost [`Dispatch`](crate::Dispatch) and returns the new outermost one.

use std::fmt;

/// Wraps `In` into `Self::Out`
pub trait Decorator<In> {
    type Out;

    fn decorate(&self, raw: In) -> Self::Out;
}

/// A decorator backed by a plain function or closure
#[derive(Copy, Clone)]
pub struct DecoratorFn<F> {
    f: F,
}

/// Lifts `f` into a [`Decorator`]
///
/// # Example
/// ```
/// use sixi_web::{decorator_fn, Decorator};
///
/// let shout = decorator_fn(|s: String| s.to_uppercase());
/// assert_eq!(shout.decorate("hi".to_string()), "HI");
/// ```
pub fn decorator_fn<In, Out, F>(f: F) -> DecoratorFn<F>
where
    F: Fn(In) -> Out,
{
    DecoratorFn { f }
}

impl<In, Out, F> Decorator<In> for DecoratorFn<F>
where
    F: Fn(In) -> Out,
{
    type Out = Out;

    #[inline]
    fn decorate(&self, raw: In) -> Self::Out {
        (self.f)(raw)
    }
}

impl<F> fmt::Debug for DecoratorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorFn").field("f", &std::any::type_name::<F>()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_decorators_nest_outward() {
        let tag = |name: &'static str| decorator_fn(move |s: String| format!("{name}({s})"));
        let decorators = [tag("m1"), tag("m2")];

        let wrapped = decorators.iter().fold("core".to_string(), |inner, decorator| decorator.decorate(inner));
        assert_eq!(wrapped, "m2(m1(core))");
    }
}

use std::fmt::Display;
use tracing::debug;

/// Best-effort fields: a failure is logged and replaced, never surfaced.
pub(crate) trait BestEffort<T> {
    fn or_fallback(self, field: &'static str, fallback: T) -> T;

    #[inline]
    fn or_default_for(self, field: &'static str) -> T
    where
        Self: Sized,
        T: Default,
    {
        self.or_fallback(field, T::default())
    }
}

impl<T, E: Display> BestEffort<T> for Result<T, E> {
    #[inline]
    fn or_fallback(self, field: &'static str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                debug!(field, error = %err, "falling back to default");
                fallback
            }
        }
    }
}

impl<T> BestEffort<T> for Option<T> {
    #[inline]
    fn or_fallback(self, field: &'static str, fallback: T) -> T {
        self.unwrap_or_else(|| {
            debug!(field, "missing, falling back to default");
            fallback
        })
    }
}

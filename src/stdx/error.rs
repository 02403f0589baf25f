use thiserror::Error;

macro_rules! assumption {
    ($msg:literal $(, $args:expr)* $(,)?) => {{
        return Err($crate::stdx::error::Assumption::from(format!($msg $(, $args)*)).into());
    }};
    ($cond:expr, $msg:literal $(, $args:expr)* $(,)?) => {{
        if !$cond {
            return Err($crate::stdx::error::Assumption::from(format!(
                "`{}`, {}",
                stringify!($cond),
                format!($msg $(, $args)*)
            ))
            .into());
        }
    }};
}

pub(crate) use assumption;

/// Represents an assumption about the markup of a page that did not hold.
///
/// # Use
///
/// Only used for the shape of pages and API responses the service returns. An
/// `Assumption` never leaves the crate as is: at the page boundary it is turned
/// into a [`ParseFailure`](crate::platform::ehentai::errors::ParseFailure) that
/// knows which page was being parsed and carries an excerpt of the body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct Assumption(String);

impl Assumption {
    #[inline]
    pub(crate) fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for Assumption {
    #[inline]
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

impl From<&str> for Assumption {
    #[inline]
    fn from(msg: &str) -> Self {
        Self(msg.to_owned())
    }
}

pub(crate) trait Assume<T> {
    fn assumption(self, msg: impl Into<String>) -> Result<T, Assumption>;
}

impl<T> Assume<T> for Option<T> {
    #[inline]
    fn assumption(self, msg: impl Into<String>) -> Result<T, Assumption> {
        self.ok_or_else(|| Assumption(msg.into()))
    }
}

impl<T, E> Assume<T> for Result<T, E> {
    #[inline]
    fn assumption(self, msg: impl Into<String>) -> Result<T, Assumption> {
        self.map_err(|_err: E| Assumption(msg.into()))
    }
}

pub(crate) trait AssumeFor<T, E> {
    fn assumption_for<F>(self, f: F) -> Result<T, Assumption>
    where
        F: FnOnce(E) -> String;
}

impl<T, E> AssumeFor<T, E> for Result<T, E> {
    #[inline]
    fn assumption_for<F>(self, f: F) -> Result<T, Assumption>
    where
        F: FnOnce(E) -> String,
    {
        self.map_err(|err| Assumption(f(err)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bail() -> Result<(), Assumption> {
        assumption!("failed to uphold assumption");
    }

    fn bail_on_condition(panels: &[()]) -> Result<(), Assumption> {
        assumption!(
            !panels.is_empty(),
            "preview set should not be empty, but was {}",
            panels.len()
        );
        Ok(())
    }

    #[test]
    fn should_bail_with_message() {
        assert_eq!(Err(Assumption::from("failed to uphold assumption")), bail());
    }

    #[test]
    fn should_bail_on_condition_fail_with_message() {
        let err = bail_on_condition(&[]).unwrap_err();
        assert_eq!(
            "`!panels.is_empty()`, preview set should not be empty, but was 0",
            err.message()
        );
        assert_eq!(Ok(()), bail_on_condition(&[()]));
    }

    #[test]
    fn should_error_with_assumption() {
        let missing: Option<()> = None;
        let err = missing
            .assumption("failed to find `#gdt` on gallery detail page")
            .unwrap_err();
        assert_eq!("failed to find `#gdt` on gallery detail page", err.to_string());
    }

    #[test]
    fn should_format_assumption_for_error() {
        let err = "x1".parse::<u32>().assumption_for(|err| format!("bad page count: {err}"));
        assert_eq!(
            "bad page count: invalid digit found in string",
            err.unwrap_err().message()
        );
    }
}

//! Extension trait for Result types.

use crate::node::{Error, WrappedError, Wrapper};
use crate::value::Fields;

/// Wrap the error side of a `Result` into a new chain node.
///
/// The original error becomes the node's `previous`; the location is the
/// caller's. Paths are shortened with [`Wrapper::global`]; use
/// [`Wrapper::wrap_result`] for other roots.
///
/// ```
/// use wrapped_errors::{fields, WrapExt};
///
/// fn parse(raw: &str) -> wrapped_errors::Result<u16> {
///     raw.parse::<u16>().wrap_msg("parsing port", Some(fields! { "raw" => raw }))
/// }
///
/// let err = parse("http").unwrap_err();
/// assert_eq!(err.fields()["raw"], "http");
/// assert!(err.render().ends_with("<br> Message: invalid digit found in string."));
/// ```
pub trait WrapExt<T> {
    /// Wrap the error with `actual` and `fields`.
    fn wrap_err<A: Into<Error>>(self, actual: A, fields: Option<Fields>) -> Result<T, WrappedError>;

    /// Wrap the error with a message and `fields`.
    fn wrap_msg(self, message: impl Into<String>, fields: Option<Fields>) -> Result<T, WrappedError>;
}

impl<T, E: Into<Error>> WrapExt<T> for Result<T, E> {
    #[track_caller]
    fn wrap_err<A: Into<Error>>(self, actual: A, fields: Option<Fields>) -> Result<T, WrappedError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Wrapper::global().build(Some(e.into()), actual.into(), fields)),
        }
    }

    #[track_caller]
    fn wrap_msg(self, message: impl Into<String>, fields: Option<Fields>) -> Result<T, WrappedError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Wrapper::global().build(Some(e.into()), Error::msg(message), fields)),
        }
    }
}

impl Wrapper {
    /// [`WrapExt::wrap_err`] with this wrapper's roots.
    ///
    /// ```
    /// use wrapped_errors::{Error, Roots, Wrapper};
    ///
    /// let wrapper = Wrapper::new(Roots::new());
    /// let failed: Result<(), _> = Err(Error::msg("disk full"));
    /// let err = wrapper.wrap_result(failed, Error::msg("saving"), None).unwrap_err();
    /// assert_eq!(err.location().file(), file!());
    /// ```
    #[track_caller]
    pub fn wrap_result<T, E, A>(&self, result: Result<T, E>, actual: A, fields: Option<Fields>) -> Result<T, WrappedError>
    where
        E: Into<Error>,
        A: Into<Error>,
    {
        match result {
            Ok(v) => Ok(v),
            Err(e) => Err(self.build(Some(e.into()), actual.into(), fields)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Roots;
    use crate::node::StringError;

    #[test]
    fn test_ok_passes_through() {
        let ok: Result<u8, StringError> = Ok(3);
        assert_eq!(ok.wrap_msg("unused", None).unwrap(), 3);
    }

    #[test]
    fn test_wrap_msg_attributes_caller() {
        let failed: Result<(), StringError> = Err(StringError::new("low level"));
        let (err, line) = (failed.wrap_msg("high level", None).unwrap_err(), line!());
        assert_eq!(err.location().line(), line);
        assert_eq!(err.actual().to_string(), "high level");
        assert_eq!(err.previous().unwrap().to_string(), "low level");
    }

    #[test]
    fn test_wrap_err_extends_chain() {
        let inner: Result<(), WrappedError> = Err(Wrapper::default().new_from_message("inner", None));
        let err = inner.wrap_err(StringError::new("outer"), None).unwrap_err();
        assert!(!err.is_root());
        assert!(err.render().starts_with("Message: outer. Location: "));
    }

    #[test]
    fn test_wrap_result_uses_wrapper_roots() {
        let wrapper = Wrapper::new(Roots::new().with_dependencies("src/"));
        let failed: Result<(), StringError> = Err(StringError::new("low level"));
        let (result, line) = (wrapper.wrap_result(failed, StringError::new("high"), None), line!());
        let err = result.unwrap_err();
        assert_eq!(err.location().file(), "ext.rs");
        assert_eq!(err.location().line(), line);
        assert_eq!(err.frames()[0], err.location());
        assert_eq!(err.previous().unwrap().to_string(), "low level");
    }

    #[test]
    fn test_wrap_result_passes_ok_through() {
        let ok: Result<u8, StringError> = Ok(3);
        assert_eq!(Wrapper::default().wrap_result(ok, Error::msg("unused"), None).unwrap(), 3);
    }
}

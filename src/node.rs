//! Chain nodes and their construction.

use std::error::Error as StdError;
use std::fmt;
use std::sync::OnceLock;

use crate::location::{Frame, Location, Roots};
use crate::trace::{self, Stack};
use crate::value::Fields;

// ============================================================
// Error - type-erased actual/previous errors
// ============================================================

/// Type-erased, owned error held by a node.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into it. It does
/// NOT implement `Error` itself so that the blanket `From` impl stays
/// coherent; use [`Error::as_dyn_error`] to get at the inner error.
#[derive(Debug)]
pub struct Error(Box<dyn StdError + Send + Sync + 'static>);

impl Error {
    /// Create from any error type.
    #[inline]
    pub fn new<E: StdError + Send + Sync + 'static>(e: E) -> Self {
        Self(Box::new(e))
    }

    /// Create from a boxed error.
    #[inline]
    pub fn from_box(e: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self(e)
    }

    /// Create a plain message error.
    #[inline]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(StringError::new(message))
    }

    /// Get the inner error as a trait object reference.
    #[inline]
    pub fn as_dyn_error(&self) -> &(dyn StdError + 'static) {
        self.0.as_ref()
    }

    /// Try to downcast to a specific error type.
    #[inline]
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// The inner error as a chain node, if it is one.
    #[inline]
    pub fn as_node(&self) -> Option<&WrappedError> {
        self.downcast_ref::<WrappedError>()
    }

    /// Get the inner boxed error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.0
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<E: StdError + Send + Sync + 'static> From<E> for Error {
    fn from(e: E) -> Self {
        Error::new(e)
    }
}

// ============================================================
// StringError
// ============================================================

/// An error that is nothing but its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringError(String);

impl StringError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for StringError {}

// ============================================================
// WrappedError - one node of a chain
// ============================================================

/// One node of an error chain.
///
/// A node wraps the error it introduces (`actual`) over the error it was
/// built on (`previous`), together with the diagnostic [`Fields`] of this
/// wrap and the location it was created at. The root node of a chain also
/// owns the captured call stack.
///
/// Nodes are immutable. Wrapping builds a new node that owns the old chain.
///
/// # Examples
///
/// ```
/// use wrapped_errors::{fields, new_from_message, wrap, Error};
///
/// let root = new_from_message("disk full", Some(fields! { "free" => 0u64 }));
/// let outer = wrap(Some(root), Some(Error::msg("saving report")), None).unwrap();
///
/// assert!(outer.render().starts_with("Message: saving report. Location: "));
/// assert!(outer.render().ends_with("Fields: map[free:0]."));
/// assert_eq!(outer.collect_all_fields()["free"], 0u64);
/// ```
#[derive(Debug)]
pub struct WrappedError {
    actual: Error,
    previous: Option<Error>,
    fields: Fields,
    location: Location,
    /// Empty unless this node is the chain root, whose first frame is its
    /// own location.
    stack: Stack,
}

impl WrappedError {
    /// The error this node introduces.
    pub fn actual(&self) -> &Error {
        &self.actual
    }

    /// The error this node was wrapped over, if any.
    pub fn previous(&self) -> Option<&Error> {
        self.previous.as_ref()
    }

    /// The previous error when it is itself a node.
    pub fn previous_node(&self) -> Option<&WrappedError> {
        self.previous.as_ref().and_then(Error::as_node)
    }

    /// Fields attached by this wrap only.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Where this node was constructed.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Whether this node is the root of its chain.
    pub fn is_root(&self) -> bool {
        self.previous_node().is_none()
    }

    /// Stack frames of the chain root, innermost first.
    pub fn frames(&self) -> &[Frame] {
        match self.previous_node() {
            Some(previous) => previous.frames(),
            None => &self.stack[..],
        }
    }

    /// Stack of the chain root as space-separated `file:line` frames.
    pub fn stacktrace(&self) -> String {
        trace::join(self.frames())
    }

    /// This node's fields merged with every ancestor's.
    ///
    /// On a key present at several levels the value closest to the root
    /// wins.
    pub fn collect_all_fields(&self) -> Fields {
        let mut fields = self.fields.clone();
        if let Some(previous) = self.previous_node() {
            fields.extend(previous.collect_all_fields());
        }
        fields
    }

    /// Render the whole chain on one line, outermost node first.
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn fmt_actual(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message: {}. Location: {}", self.actual, self.location)?;
        if !self.fields.is_empty() {
            f.write_str(". Fields: map[")?;
            for (idx, (key, value)) in self.fields.iter().enumerate() {
                if idx > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}:{}", key, value)?;
            }
            f.write_str("].")?;
        }
        Ok(())
    }
}

impl fmt::Display for WrappedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_actual(f)?;
        match &self.previous {
            Some(previous) if previous.as_node().is_some() => write!(f, " <br> {}", previous),
            Some(previous) => write!(f, " <br> Message: {}.", previous),
            None => Ok(()),
        }
    }
}

impl StdError for WrappedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.previous.as_ref().map(Error::as_dyn_error)
    }
}

// ============================================================
// Wrapper - configured constructors
// ============================================================

/// Builds nodes, normalizing locations against its [`Roots`].
///
/// The free functions [`new_from_message`], [`new_from_error`] and [`wrap`]
/// use [`Wrapper::global`]. Build your own to control how paths are shown:
///
/// ```
/// use wrapped_errors::{Roots, Wrapper};
///
/// let wrapper = Wrapper::new(Roots::new());
/// let err = wrapper.new_from_message("boom", None);
/// assert_eq!(err.location().file(), file!());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Wrapper {
    roots: Roots,
}

static GLOBAL: OnceLock<Wrapper> = OnceLock::new();

impl Wrapper {
    pub fn new(roots: Roots) -> Self {
        Self { roots }
    }

    /// Shared wrapper with [`Roots::from_env`], built on first use.
    pub fn global() -> &'static Wrapper {
        GLOBAL.get_or_init(|| Wrapper::new(Roots::from_env()))
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    /// Root node wrapping a new message error.
    #[track_caller]
    pub fn new_from_message(&self, message: impl Into<String>, fields: Option<Fields>) -> WrappedError {
        self.build(None, Error::msg(message), fields)
    }

    /// Root node wrapping `actual`, or `None` without an error to wrap.
    #[track_caller]
    pub fn new_from_error<E: Into<Error>>(&self, actual: Option<E>, fields: Option<Fields>) -> Option<WrappedError> {
        // A closure here would report its own location instead of the caller's.
        match actual {
            Some(actual) => Some(self.build(None, actual.into(), fields)),
            None => None,
        }
    }

    /// Node introducing `actual` over `previous`, or `None` without an error
    /// to wrap.
    #[track_caller]
    pub fn wrap<P, E>(&self, previous: Option<P>, actual: Option<E>, fields: Option<Fields>) -> Option<WrappedError>
    where
        P: Into<Error>,
        E: Into<Error>,
    {
        match actual {
            Some(actual) => Some(self.build(previous.map(Into::into), actual.into(), fields)),
            None => None,
        }
    }

    #[track_caller]
    pub(crate) fn build(&self, previous: Option<Error>, actual: Error, fields: Option<Fields>) -> WrappedError {
        let location = Location::caller(&self.roots);
        let fields = fields.unwrap_or_default();
        let is_root = previous.as_ref().and_then(Error::as_node).is_none();
        let stack = if is_root {
            trace::capture(&self.roots, location)
        } else {
            Stack::default()
        };

        tracing::trace!(
            location = %location,
            root = is_root,
            fields = fields.len(),
            "wrapped error"
        );

        WrappedError {
            actual,
            previous,
            fields,
            location,
            stack,
        }
    }
}

// ============================================================
// Free constructors
// ============================================================

/// Root node wrapping a new error built from `message`.
///
/// ```
/// use wrapped_errors::{fields, new_from_message};
///
/// let err = new_from_message("boom", Some(fields! { "x" => "y" }));
/// let expected = format!("Message: boom. Location: {}. Fields: map[x:y].", err.location());
/// assert_eq!(err.render(), expected);
/// ```
#[track_caller]
pub fn new_from_message(message: impl Into<String>, fields: Option<Fields>) -> WrappedError {
    Wrapper::global().new_from_message(message, fields)
}

/// Root node wrapping `actual`; `None` when there is nothing to wrap.
#[track_caller]
pub fn new_from_error<E: Into<Error>>(actual: Option<E>, fields: Option<Fields>) -> Option<WrappedError> {
    Wrapper::global().new_from_error(actual, fields)
}

/// Node introducing `actual` over `previous`; `None` when there is nothing
/// to wrap.
///
/// Only a node that starts a chain captures a stack. Wrapping a
/// [`WrappedError`] reuses the stack of its root.
#[track_caller]
pub fn wrap<P, E>(previous: Option<P>, actual: Option<E>, fields: Option<Fields>) -> Option<WrappedError>
where
    P: Into<Error>,
    E: Into<Error>,
{
    Wrapper::global().wrap(previous, actual, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    fn wrapper() -> Wrapper {
        Wrapper::new(Roots::new())
    }

    #[test]
    fn test_root_owns_stack() {
        let root = wrapper().new_from_message("inner", None);
        assert!(root.is_root());
        assert!(!root.stack.is_empty());

        let outer = wrapper().wrap(Some(root), Some(Error::msg("outer")), None).unwrap();
        assert!(!outer.is_root());
        assert!(outer.stack.is_empty());
        assert!(!outer.frames().is_empty());
    }

    #[test]
    fn test_root_stack_starts_at_location() {
        let root = wrapper().new_from_message("inner", None);
        assert_eq!(root.frames()[0], root.location());
        assert!(root.stacktrace().starts_with(&root.location().to_string()));

        let outer = wrapper().wrap(Some(root), Some(Error::msg("outer")), None).unwrap();
        let root = outer.previous_node().unwrap();
        assert_eq!(outer.frames()[0], root.location());
        assert_ne!(outer.frames()[0], outer.location());
    }

    #[test]
    fn test_wrap_over_plain_error_is_root() {
        let node = wrapper()
            .wrap(Some(StringError::new("io")), Some(StringError::new("read")), None)
            .unwrap();
        assert!(node.is_root());
        assert!(!node.stack.is_empty());
    }

    #[test]
    fn test_missing_actual_builds_nothing() {
        assert!(wrapper().new_from_error(None::<StringError>, None).is_none());
        assert!(wrapper()
            .wrap(Some(StringError::new("prev")), None::<Error>, None)
            .is_none());
    }

    #[test]
    fn test_location_is_call_site() {
        let (err, line) = (wrapper().new_from_message("x", None), line!());
        assert_eq!(err.location().file(), file!());
        assert_eq!(err.location().line(), line);
    }

    #[test]
    fn test_aggregation_does_not_touch_nodes() {
        let root = wrapper().new_from_message("a", Some(fields! { "k" => "root" }));
        let outer = wrapper()
            .wrap(Some(root), Some(Error::msg("b")), Some(fields! { "k" => "leaf" }))
            .unwrap();

        assert_eq!(outer.collect_all_fields()["k"], "root");
        assert_eq!(outer.fields()["k"], "leaf");
    }

    #[test]
    fn test_source_is_previous() {
        let node = wrapper()
            .wrap(Some(StringError::new("cause")), Some(Error::msg("effect")), None)
            .unwrap();
        let source = node.source().unwrap();
        assert_eq!(source.to_string(), "cause");
    }
}

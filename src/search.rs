//! Searches over a chain, outermost node first.
//!
//! Every search reports the fields of the node that held the match, never
//! the aggregate of the chain.

use std::error::Error as StdError;
use std::fmt;

use crate::node::{StringError, WrappedError};
use crate::value::{Fields, EMPTY_FIELDS};

// ============================================================
// Generic error marker
// ============================================================

/// Payload-free marker error identifying a caller-defined category.
///
/// [`find_generic_error`] looks for it; [`find_typed`] does the same search
/// for any error type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericError;

impl GenericError {
    /// Always true; marks the category.
    pub fn is_generic_error(&self) -> bool {
        true
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GenericError")
    }
}

impl StdError for GenericError {}

/// Find a [`GenericError`] in the chain headed by `err`.
pub fn find_generic_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<(&'a GenericError, &'a Fields)> {
    find_typed::<GenericError>(err)
}

/// Find the first error of type `T` in the chain headed by `err`.
///
/// `err` itself matches with empty fields. Otherwise each node checks its
/// own `actual`, then looks one level ahead at `previous`, and only then
/// descends into `previous` when that is a node. A match carries the fields
/// of the node whose `actual` or `previous` it was.
///
/// ```
/// use wrapped_errors::{fields, find_typed, wrap, Error, GenericError};
///
/// let node = wrap(Some(GenericError), Some(Error::msg("lookup")), Some(fields! { "id" => 7 })).unwrap();
/// let (found, fields) = find_typed::<GenericError>(&node).unwrap();
/// assert!(found.is_generic_error());
/// assert_eq!(fields["id"], 7i64);
/// ```
pub fn find_typed<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<(&'a T, &'a Fields)> {
    if let Some(found) = err.downcast_ref::<T>() {
        return Some((found, &EMPTY_FIELDS));
    }
    let node = err.downcast_ref::<WrappedError>()?;
    if let Some(found) = node.actual().downcast_ref::<T>() {
        return Some((found, node.fields()));
    }
    let previous = node.previous()?;
    if let Some(found) = previous.downcast_ref::<T>() {
        return Some((found, node.fields()));
    }
    match previous.as_node() {
        Some(_) => find_typed::<T>(previous.as_dyn_error()),
        None => None,
    }
}

// ============================================================
// Value and prefix lookup
// ============================================================

/// Visit each error of the chain: every node's `actual`, then the terminal
/// non-node error. Each is paired with the fields of the node holding it;
/// a bare `err` that is not a node gets empty fields.
fn walk<'a, R>(
    err: &'a (dyn StdError + 'static),
    mut visit: impl FnMut(&'a (dyn StdError + 'static), &'a Fields) -> Option<R>,
) -> Option<R> {
    let mut node = match err.downcast_ref::<WrappedError>() {
        Some(node) => node,
        None => return visit(err, &EMPTY_FIELDS),
    };
    loop {
        if let Some(found) = visit(node.actual().as_dyn_error(), node.fields()) {
            return Some(found);
        }
        let previous = node.previous()?;
        match previous.as_node() {
            Some(next) => node = next,
            None => return visit(previous.as_dyn_error(), node.fields()),
        }
    }
}

/// Find an error equal to `target` in the chain headed by `err`.
///
/// Returns the error held by the chain and the fields of its node. Nothing
/// is found without a target or a chain.
///
/// ```
/// use wrapped_errors::{fields, find_error, wrap, StringError};
///
/// let node = wrap(
///     Some(StringError::new("timeout")),
///     Some(StringError::new("fetching user")),
///     Some(fields! { "user" => "u-42" }),
/// )
/// .unwrap();
///
/// let target = StringError::new("timeout");
/// let (found, fields) = find_error(Some(&target), Some(&node)).unwrap();
/// assert_eq!(found, &target);
/// assert_eq!(fields["user"], "u-42");
/// ```
pub fn find_error<'a, T>(
    target: Option<&T>,
    err: Option<&'a (dyn StdError + 'static)>,
) -> Option<(&'a T, &'a Fields)>
where
    T: StdError + PartialEq + 'static,
{
    let (target, err) = (target?, err?);
    let found = walk(err, |candidate, fields| match candidate.downcast_ref::<T>() {
        Some(found) if found == target => Some((found, fields)),
        _ => None,
    });
    if found.is_none() {
        tracing::trace!(target_error = %target, "error not found in chain");
    }
    found
}

/// Find the first error in the chain headed by `err` whose message starts
/// with `prefix`.
///
/// The match comes back as a [`StringError`] holding the full message of
/// the matched error, with the fields of its node.
pub fn find_error_by_prefix<'a>(
    prefix: Option<&str>,
    err: Option<&'a (dyn StdError + 'static)>,
) -> Option<(StringError, &'a Fields)> {
    let (prefix, err) = (prefix?, err?);
    let found = walk(err, |candidate, fields| {
        let message = candidate.to_string();
        if message.starts_with(prefix) {
            Some((StringError::new(message), fields))
        } else {
            None
        }
    });
    if found.is_none() {
        tracing::trace!(prefix, "no error with prefix in chain");
    }
    found
}

impl WrappedError {
    /// Find an error equal to `target` in this chain.
    pub fn find_error<T>(&self, target: &T) -> Option<(&T, &Fields)>
    where
        T: StdError + PartialEq + 'static,
    {
        find_error(Some(target), Some(self as &(dyn StdError + 'static)))
    }

    /// Find the first error in this chain whose message starts with `prefix`.
    pub fn find_error_by_prefix(&self, prefix: &str) -> Option<(StringError, &Fields)> {
        find_error_by_prefix(Some(prefix), Some(self as &(dyn StdError + 'static)))
    }

    /// Find the first error of type `T` in this chain.
    pub fn find_typed<T: StdError + 'static>(&self) -> Option<(&T, &Fields)> {
        find_typed::<T>(self)
    }
}

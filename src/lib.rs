//! wrapped-errors - chains of wrapped errors with locations and fields
//!
//! # Overview
//!
//! Each wrap produces a [`WrappedError`] node holding the error it
//! introduces, the error it wraps, a map of diagnostic [`Fields`] and the
//! call site that built it. The first node of a chain also captures the
//! call stack. Nodes are immutable; wrapping again builds a new node.
//!
//! # Quick Start
//!
//! ```
//! use wrapped_errors::{fields, find_error_by_prefix, new_from_message, wrap, Error};
//!
//! let root = new_from_message("connection refused", Some(fields! { "host" => "db-1" }));
//! let err = wrap(Some(root), Some(Error::msg("loading orders")), Some(fields! { "page" => 3 })).unwrap();
//!
//! let all = err.collect_all_fields();
//! assert_eq!(all["host"], "db-1");
//! assert_eq!(all["page"], 3i64);
//!
//! let (found, fields) = find_error_by_prefix(Some("connection"), Some(&err)).unwrap();
//! assert_eq!(found.as_str(), "connection refused");
//! assert_eq!(fields["host"], "db-1");
//! ```
//!
//! # Operations
//!
//! ## Construction
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`new_from_message`] | Root node from a message |
//! | [`new_from_error`] | Root node from an error, `None` without one |
//! | [`wrap`] | Node over a previous error, `None` without an actual error |
//! | [`WrapExt`] | Same as `wrap` on the error side of a `Result` |
//! | [`Wrapper`] | Constructors with explicit path [`Roots`] |
//!
//! ## Inspection
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`WrappedError::render`] | Whole chain on one line |
//! | [`WrappedError::collect_all_fields`] | Fields of every node, root-ward values winning |
//! | [`WrappedError::stacktrace`] | Root stack as `file:line` frames |
//!
//! ## Search
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`find_generic_error`] | First [`GenericError`] marker in the chain |
//! | [`find_typed`] | First error of a given type |
//! | [`find_error`] | First error equal to a target |
//! | [`find_error_by_prefix`] | First error whose message starts with a prefix |

// ============================================================
// Modules
// ============================================================

mod ext;
mod location;
mod macros;
mod node;
mod search;
mod trace;
mod value;

// ============================================================
// Re-exports
// ============================================================

pub use ext::WrapExt;
pub use location::{Frame, Location, Roots, DEFAULT_STDLIB_ROOT};
pub use node::{new_from_error, new_from_message, wrap, Error, StringError, WrappedError, Wrapper};
pub use search::{find_error, find_error_by_prefix, find_generic_error, find_typed, GenericError};
pub use trace::MAX_FRAMES;
pub use value::{Fields, IntoValue, Value};

// ============================================================
// Type aliases
// ============================================================

/// Result type alias.
///
/// - `Result<T>` = `core::result::Result<T, WrappedError>`
/// - `Result<T, io::Error>` = any other error type
pub type Result<T, E = WrappedError> = core::result::Result<T, E>;

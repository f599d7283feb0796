//! Source locations and the path roots used to shorten them.

use std::env;
use std::fmt;

/// Where a node was constructed, in `file:line` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    file: &'static str,
    line: u32,
}

impl Location {
    pub(crate) fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Location of the nearest `#[track_caller]` call site, normalized against `roots`.
    #[track_caller]
    pub(crate) fn caller(roots: &Roots) -> Self {
        let loc = core::panic::Location::caller();
        Self::new(roots.clean(loc.file()), loc.line())
    }

    /// Source file, relative to a root when one matched.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Line number of the call site.
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One frame of a captured stack trace.
///
/// A frame without debug info has no line, and its file is the symbol name
/// (or `<unknown>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    file: String,
    line: Option<u32>,
}

impl Frame {
    pub(crate) fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Source file of the frame.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number of the frame, when known.
    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl From<Location> for Frame {
    fn from(location: Location) -> Self {
        Frame::new(location.file, Some(location.line))
    }
}

impl PartialEq<Location> for Frame {
    fn eq(&self, other: &Location) -> bool {
        self.file == other.file && self.line == Some(other.line)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => f.write_str(&self.file),
        }
    }
}

/// Path prefixes stripped from locations so they read the same on every machine.
///
/// The dependencies root is tried first, then the standard-library root. A
/// path matching neither is kept as is.
///
/// ```
/// use wrapped_errors::Roots;
///
/// let roots = Roots::new()
///     .with_dependencies("/home/dev/.cargo/registry/src")
///     .with_stdlib("/rustc");
/// assert_eq!(
///     roots.clean("/home/dev/.cargo/registry/src/index/serde-1.0.0/src/de.rs"),
///     "/index/serde-1.0.0/src/de.rs",
/// );
/// assert_eq!(roots.clean("src/main.rs"), "src/main.rs");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roots {
    dependencies: Option<String>,
    stdlib: Option<String>,
}

/// Prefix under which release toolchains place their library sources.
pub const DEFAULT_STDLIB_ROOT: &str = "/rustc";

impl Roots {
    /// No roots: paths are never shortened.
    pub fn new() -> Self {
        Self::default()
    }

    /// Roots derived from the environment.
    ///
    /// Dependencies live under `$CARGO_HOME/registry/src`, with `CARGO_HOME`
    /// falling back to `$HOME/.cargo`. The standard library root is
    /// [`DEFAULT_STDLIB_ROOT`].
    pub fn from_env() -> Self {
        Self::from_vars(env::var("CARGO_HOME").ok(), env::var("HOME").ok())
    }

    /// [`Roots::from_env`] over given `CARGO_HOME` and `HOME` values.
    pub(crate) fn from_vars(cargo_home: Option<String>, home: Option<String>) -> Self {
        let cargo_home = cargo_home
            .filter(|home| !home.is_empty())
            .or_else(|| home.map(|home| format!("{}/.cargo", home)));

        Self {
            dependencies: cargo_home.map(|home| format!("{}/registry/src", home)),
            stdlib: Some(DEFAULT_STDLIB_ROOT.to_string()),
        }
    }

    /// Set the root of external dependency sources.
    pub fn with_dependencies(mut self, root: impl Into<String>) -> Self {
        self.dependencies = Some(root.into());
        self
    }

    /// Set the root of standard-library sources.
    pub fn with_stdlib(mut self, root: impl Into<String>) -> Self {
        self.stdlib = Some(root.into());
        self
    }

    pub fn dependencies(&self) -> Option<&str> {
        self.dependencies.as_deref()
    }

    pub fn stdlib(&self) -> Option<&str> {
        self.stdlib.as_deref()
    }

    /// Trim the first matching root off `file`.
    pub fn clean<'a>(&self, file: &'a str) -> &'a str {
        [self.dependencies(), self.stdlib()]
            .into_iter()
            .flatten()
            .filter(|root| !root.is_empty())
            .find_map(|root| file.strip_prefix(root))
            .unwrap_or(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_root_wins_over_stdlib() {
        let roots = Roots::new().with_dependencies("/deps").with_stdlib("/deps/std");
        assert_eq!(roots.clean("/deps/std/io.rs"), "/std/io.rs");
    }

    #[test]
    fn test_stdlib_root_trimmed() {
        let roots = Roots::new().with_stdlib("/rustc");
        assert_eq!(
            roots.clean("/rustc/abc123/library/core/src/option.rs"),
            "/abc123/library/core/src/option.rs"
        );
    }

    #[test]
    fn test_unmatched_and_empty_roots_leave_path() {
        let roots = Roots::new().with_dependencies("");
        assert_eq!(roots.clean("/srv/app/main.rs"), "/srv/app/main.rs");
        assert_eq!(Roots::new().clean("tests/chain.rs"), "tests/chain.rs");
    }

    #[test]
    fn test_default_roots_use_cargo_home() {
        let roots = Roots::from_vars(Some("/opt/cargo".into()), Some("/home/dev".into()));
        assert_eq!(roots.dependencies(), Some("/opt/cargo/registry/src"));
        assert_eq!(roots.stdlib(), Some(DEFAULT_STDLIB_ROOT));
    }

    #[test]
    fn test_default_roots_fall_back_to_home() {
        let unset = Roots::from_vars(None, Some("/home/dev".into()));
        assert_eq!(unset.dependencies(), Some("/home/dev/.cargo/registry/src"));

        let empty = Roots::from_vars(Some(String::new()), Some("/home/dev".into()));
        assert_eq!(empty, unset);

        let neither = Roots::from_vars(None, None);
        assert_eq!(neither.dependencies(), None);
        assert_eq!(neither.stdlib(), Some("/rustc"));
        assert_eq!(neither.clean("/rustc/abc/library/std/src/rt.rs"), "/abc/library/std/src/rt.rs");
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let expected = Roots::from_vars(env::var("CARGO_HOME").ok(), env::var("HOME").ok());
        assert_eq!(Roots::from_env(), expected);
    }

    #[test]
    fn test_frame_matches_its_location() {
        let loc = Location::new("src/lib.rs", 7);
        let frame = Frame::from(loc);
        assert_eq!(frame, loc);
        assert_eq!(frame.to_string(), loc.to_string());
        assert_eq!(Frame::new("<unknown>", None).to_string(), "<unknown>");
    }

    #[test]
    fn test_caller_location_points_here() {
        let line = line!() + 1;
        let loc = Location::caller(&Roots::new());
        assert_eq!(loc.file(), file!());
        assert_eq!(loc.line(), line);
        assert_eq!(loc.to_string(), format!("{}:{}", file!(), line));
    }
}

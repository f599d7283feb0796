//! Stack capture for chain roots.

use smallvec::SmallVec;

use crate::location::{Frame, Location, Roots};

/// Maximum number of frames kept on a root node.
pub const MAX_FRAMES: usize = 20;

/// Captured call stack, innermost frame first.
pub type Stack = Box<[Frame]>;

/// Symbol path prefixes belonging to the capture machinery itself.
const INTERNAL: &[&str] = &[
    "backtrace::",
    concat!(env!("CARGO_CRATE_NAME"), "::trace::"),
    concat!(env!("CARGO_CRATE_NAME"), "::node::"),
    concat!(env!("CARGO_CRATE_NAME"), "::ext::"),
];

/// Where the walk is in the captured stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Inside `backtrace` and this crate, up to and including the call site.
    Skip,
    Record,
}

/// Capture up to [`MAX_FRAMES`] frames, starting at `call_site`.
///
/// The first frame is always `call_site`, so a root has a stack even without
/// debug info. The frames above it come from unwinding: leading frames of this
/// crate and of `backtrace` are skipped, then the caller's own frame, which
/// `call_site` already stands for. Frames without file information keep their
/// symbol name, or `<unknown>`.
pub(crate) fn capture(roots: &Roots, call_site: Location) -> Stack {
    let mut stack: SmallVec<[Frame; MAX_FRAMES]> = SmallVec::new();
    stack.push(Frame::from(call_site));
    let mut phase = Phase::Skip;

    backtrace::trace(|frame| {
        let mut resolved = false;
        backtrace::resolve_frame(frame, |symbol| {
            resolved = true;
            if stack.len() >= MAX_FRAMES || !advance(&mut phase, Some(symbol)) {
                return;
            }
            stack.push(frame_of(roots, symbol));
        });
        if !resolved && stack.len() < MAX_FRAMES && advance(&mut phase, None) {
            stack.push(Frame::new(UNKNOWN, None));
        }
        stack.len() < MAX_FRAMES
    });

    tracing::trace!(frames = stack.len(), "captured root stack");
    stack.into_vec().into_boxed_slice()
}

const UNKNOWN: &str = "<unknown>";

/// Step past internal frames and the first frame after them; true once
/// frames are kept.
fn advance(phase: &mut Phase, symbol: Option<&backtrace::Symbol>) -> bool {
    match *phase {
        Phase::Skip => {
            if !symbol.map_or(false, is_internal) {
                *phase = Phase::Record;
            }
            false
        }
        Phase::Record => true,
    }
}

fn frame_of(roots: &Roots, symbol: &backtrace::Symbol) -> Frame {
    match (symbol.filename(), symbol.lineno()) {
        (Some(file), line) => Frame::new(roots.clean(&file.to_string_lossy()), line),
        (None, _) => match symbol.name() {
            Some(name) => Frame::new(format!("{:#}", name), None),
            None => Frame::new(UNKNOWN, None),
        },
    }
}

fn is_internal(symbol: &backtrace::Symbol) -> bool {
    let Some(name) = symbol.name() else {
        return false;
    };
    let name = format!("{:#}", name);
    if name.contains("::tests::") {
        return false;
    }
    // `<crate::Type as Trait>::method` and `<Type as crate::Trait>::method`
    let path = name.trim_start_matches('<');
    INTERNAL
        .iter()
        .any(|prefix| path.starts_with(prefix) || name.contains(&format!(" as {prefix}")))
}

/// Render frames space-separated, innermost first.
pub(crate) fn join(stack: &[Frame]) -> String {
    let mut out = String::new();
    for (idx, frame) in stack.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(&frame.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    #[track_caller]
    fn capture_here() -> Stack {
        let roots = Roots::new();
        capture(&roots, Location::caller(&roots))
    }

    #[test]
    fn test_capture_is_bounded() {
        fn nest(depth: usize) -> Stack {
            if depth == 0 {
                capture_here()
            } else {
                nest(depth - 1)
            }
        }
        let stack = nest(MAX_FRAMES * 2);
        assert_eq!(stack.len(), MAX_FRAMES);
    }

    #[test]
    fn test_call_site_is_first_frame() {
        let (stack, line) = (capture_here(), line!());
        assert_eq!(stack[0], Frame::new(file!(), Some(line)));
    }

    #[test]
    fn test_capture_skips_backtrace_frames() {
        let stack = capture_here();
        assert!(stack.iter().all(|f| !f.file().contains("backtrace-0.")));
        assert!(stack.iter().all(|f| !f.file().starts_with("backtrace::")));
    }

    #[test]
    fn test_call_site_frame_is_not_repeated() {
        let mut phase = Phase::Skip;
        assert!(!advance(&mut phase, None));
        assert_eq!(phase, Phase::Record);
        assert!(advance(&mut phase, None));
    }

    #[test]
    fn test_join_is_space_separated() {
        let stack = [
            Frame::new("a.rs", Some(1)),
            Frame::new("b.rs", Some(2)),
            Frame::new(UNKNOWN, None),
        ];
        assert_eq!(join(&stack), "a.rs:1 b.rs:2 <unknown>");
        assert_eq!(join(&[]), "");
    }
}

// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Dotted field paths.
//!
//! Document stores address fields inside nested documents with a dotted
//! path notation: `wt.ct` is the `ct` field of the embedded `wt` document,
//! `itm.2001` is the entry keyed `2001` of the `itm` map. [`DotPath`] is the
//! value type for such paths. It is immutable: [`DotPath::resolve`] returns a
//! new, longer path and never touches the receiver, so a node can compute its
//! own path once at construction and hand out resolved sub-paths on demand.

use smallvec::SmallVec;
use std::fmt;

/// An immutable dotted field path inside a nested document.
///
/// The rendered dotted form is computed eagerly and cached, since it is the
/// form consumed by every update operation; [`DotPath::value`] is therefore
/// just a borrow.
///
/// ```rust
/// use deltadoc::DotPath;
///
/// let wallet = DotPath::of("wt");
/// assert_eq!(wallet.resolve("ct").value(), "wt.ct");
/// // resolving never mutates the receiver
/// assert_eq!(wallet.value(), "wt");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DotPath {
    // Nesting deeper than a handful of segments is rare; keep the common
    // case off the heap.
    segments: SmallVec<[String; 4]>,
    rendered: String,
}

impl DotPath {
    /// The empty path of an aggregate root.
    ///
    /// Resolving a segment against the root yields a top-level path:
    /// `DotPath::root().resolve("_id")` renders as `"_id"`.
    pub fn root() -> Self {
        Self {
            segments: SmallVec::new(),
            rendered: String::new(),
        }
    }

    /// Creates a single-segment path.
    pub fn of(segment: impl Into<String>) -> Self {
        let segment = segment.into();
        let rendered = segment.clone();
        Self {
            segments: SmallVec::from_iter([segment]),
            rendered,
        }
    }

    /// Returns a new path with `segment` appended.
    ///
    /// Accepts anything displayable so that map keys (integers, strings, ...)
    /// can be resolved directly.
    pub fn resolve(&self, segment: impl fmt::Display) -> Self {
        let segment = segment.to_string();
        let rendered = if self.rendered.is_empty() {
            segment.clone()
        } else {
            format!("{}.{segment}", self.rendered)
        };
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments, rendered }
    }

    /// The dotted rendering used as an update-operation target.
    pub fn value(&self) -> &str {
        &self.rendered
    }

    /// Returns true for the root (empty) path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The individual path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl fmt::Debug for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DotPath({:?})", self.rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        let root = DotPath::root();
        assert!(root.is_root());
        assert_eq!(root.value(), "");
        assert_eq!(root.segments().count(), 0);
    }

    #[test]
    fn resolve_from_root_has_no_leading_dot() {
        assert_eq!(DotPath::root().resolve("_id").value(), "_id");
    }

    #[test]
    fn resolve_chains() {
        let stages = DotPath::of("cs").resolve("stg");
        assert_eq!(stages.value(), "cs.stg");
        assert_eq!(stages.resolve(1).value(), "cs.stg.1");
    }

    #[test]
    fn resolve_leaves_receiver_untouched() {
        let wallet = DotPath::of("wt");
        let coin = wallet.resolve("ct");
        assert_eq!(wallet.value(), "wt");
        assert_eq!(wallet.segments().count(), 1);
        assert_eq!(coin.value(), "wt.ct");
    }

    #[test]
    fn numeric_segments_display() {
        let items = DotPath::of("itm");
        assert_eq!(items.resolve(2001).value(), "itm.2001");
    }
}

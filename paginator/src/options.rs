/// Default number of pages kept in the window.
pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

/// Configuration for [`crate::Pager`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PagerOptions {
    /// Upper bound on the number of pages held in the window. `0` is treated as `1`.
    pub max_visible_pages: usize,
    /// When `false`, only the bottom edge ever loads; top requests are ignored and the top edge
    /// reports [`crate::EdgeState::Exhausted`].
    pub bidirectional: bool,
}

impl PagerOptions {
    pub fn new(max_visible_pages: usize) -> Self {
        Self {
            max_visible_pages,
            bidirectional: true,
        }
    }

    /// Options for a forward-only feed that never drops what it loaded.
    pub fn append_only() -> Self {
        Self {
            max_visible_pages: usize::MAX,
            bidirectional: false,
        }
    }

    pub fn with_max_visible_pages(mut self, max_visible_pages: usize) -> Self {
        self.max_visible_pages = max_visible_pages;
        self
    }

    pub fn with_bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VISIBLE_PAGES)
    }
}

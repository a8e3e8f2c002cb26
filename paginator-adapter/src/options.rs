use std::time::Duration;

use paginator::PagerOptions;

/// Configuration for [`crate::Session`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionOptions {
    pub pager: PagerOptions,
    /// Fails a fetch with [`crate::FetchError::Timeout`] when the loader takes longer.
    ///
    /// Requires the tokio runtime to have its time driver enabled.
    pub fetch_timeout: Option<Duration>,
}

impl SessionOptions {
    pub fn new(pager: PagerOptions) -> Self {
        Self {
            pager,
            fetch_timeout: None,
        }
    }

    pub fn with_max_visible_pages(mut self, max_visible_pages: usize) -> Self {
        self.pager.max_visible_pages = max_visible_pages;
        self
    }

    pub fn with_bidirectional(mut self, bidirectional: bool) -> Self {
        self.pager.bidirectional = bidirectional;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Option<Duration>) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }
}

use core::fmt;

use crate::{FlatView, PageToken};

/// An item position that survives window changes.
///
/// Committing a page at the top shifts every flat index, and evicting a page at the top shifts
/// them back. An anchor names the item by its page instead, so an adapter can:
/// 1) capture an anchor for the first visible row before a commit
/// 2) receive the new view
/// 3) resolve the anchor and adjust its scroll position so the row stays in place
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemAnchor<T> {
    pub page_token: T,
    pub index_in_page: usize,
}

impl<T: fmt::Debug> fmt::Debug for ItemAnchor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemAnchor")
            .field("page_token", &self.page_token)
            .field("index_in_page", &self.index_in_page)
            .finish()
    }
}

impl<T: PageToken, I> FlatView<T, I> {
    /// Captures an anchor for the item at flat `index`.
    pub fn anchor_at(&self, index: usize) -> Option<ItemAnchor<T>> {
        let item = self.get(index)?;
        Some(ItemAnchor {
            page_token: item.page_token().clone(),
            index_in_page: item.index_in_page(),
        })
    }

    /// Returns the flat index of the anchored item in this view.
    ///
    /// Returns `None` when the anchored page is no longer in the window.
    pub fn resolve_anchor(&self, anchor: &ItemAnchor<T>) -> Option<usize> {
        let mut start = 0;
        while let Some(item) = self.get(start) {
            let page = item.page();
            if page.token() == &anchor.page_token {
                return (anchor.index_in_page < page.len()).then(|| start + anchor.index_in_page);
            }
            start += page.len();
        }
        None
    }
}

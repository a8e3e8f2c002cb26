use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;

use crate::{Edge, Page};

/// One item of a [`FlatView`], annotated with the page it came from.
///
/// The item itself is not copied: the entry holds the shared page and the item's position in it.
pub struct FlatItem<T, I> {
    page: Arc<Page<T, I>>,
    index_in_page: usize,
}

impl<T, I> FlatItem<T, I> {
    pub fn item(&self) -> &I {
        &self.page.items()[self.index_in_page]
    }

    pub fn page(&self) -> &Arc<Page<T, I>> {
        &self.page
    }

    pub fn index_in_page(&self) -> usize {
        self.index_in_page
    }

    pub fn page_token(&self) -> &T {
        self.page.token()
    }

    /// The token that loads the page above this item's page.
    pub fn previous_token(&self) -> Option<&T> {
        self.page.previous_token()
    }

    /// The token that loads the page below this item's page.
    pub fn next_token(&self) -> Option<&T> {
        self.page.next_token()
    }
}

impl<T, I> Clone for FlatItem<T, I> {
    fn clone(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
            index_in_page: self.index_in_page,
        }
    }
}

impl<T: fmt::Debug, I: fmt::Debug> fmt::Debug for FlatItem<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatItem")
            .field("item", self.item())
            .field("page_token", self.page_token())
            .field("previous_token", &self.previous_token())
            .field("next_token", &self.next_token())
            .finish()
    }
}

/// An immutable, flattened snapshot of the window handed to the consumer.
///
/// Cloning is cheap (one `Arc`).
pub struct FlatView<T, I> {
    items: Arc<[FlatItem<T, I>]>,
}

impl<T, I> FlatView<T, I> {
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlatItem<T, I>> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&FlatItem<T, I>> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&FlatItem<T, I>> {
        self.items.last()
    }

    pub fn as_slice(&self) -> &[FlatItem<T, I>] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, FlatItem<T, I>> {
        self.items.iter()
    }

    /// Iterates the bare items in order.
    pub fn items(&self) -> impl ExactSizeIterator<Item = &I> + '_ {
        self.items.iter().map(FlatItem::item)
    }

    /// The token a consumer should request when the user reaches `edge` of this view.
    ///
    /// This is the first item's `previous_token` for [`Edge::Top`] and the last item's
    /// `next_token` for [`Edge::Bottom`].
    pub fn edge_token(&self, edge: Edge) -> Option<&T> {
        match edge {
            Edge::Top => self.first().and_then(FlatItem::previous_token),
            Edge::Bottom => self.last().and_then(FlatItem::next_token),
        }
    }
}

impl<T, I> Clone for FlatView<T, I> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T, I> Default for FlatView<T, I> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug, I: fmt::Debug> fmt::Debug for FlatView<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T, I> Index<usize> for FlatView<T, I> {
    type Output = FlatItem<T, I>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a, T, I> IntoIterator for &'a FlatView<T, I> {
    type Item = &'a FlatItem<T, I>;
    type IntoIter = core::slice::Iter<'a, FlatItem<T, I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Flattens `pages` into a [`FlatView`], in order.
///
/// Pure and `O(total items)`. The result length is the sum of the page lengths.
pub fn project<'a, T: 'a, I: 'a>(
    pages: impl IntoIterator<Item = &'a Arc<Page<T, I>>>,
) -> FlatView<T, I> {
    let mut out = Vec::new();
    for page in pages {
        out.reserve(page.len());
        for index_in_page in 0..page.len() {
            out.push(FlatItem {
                page: Arc::clone(page),
                index_in_page,
            });
        }
    }
    FlatView {
        items: Arc::from(out),
    }
}

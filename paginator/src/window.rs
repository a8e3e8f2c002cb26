use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{Edge, Page, PageToken, PagerError};

/// The bounded, contiguous run of pages currently held in memory.
///
/// Invariants, checked on every insert:
/// - `window[i].next_token == window[i + 1].token` (and symmetrically for `previous_token`).
/// - No two pages share a token.
/// - `len() <= max_visible_pages()`.
///
/// Growing one end past `max_visible_pages` evicts the page at the opposite end. Interior pages
/// are never dropped, so eviction cannot open a gap in the chain.
#[derive(Clone, Debug)]
pub struct Window<T, I> {
    pages: VecDeque<Arc<Page<T, I>>>,
    max_visible_pages: usize,
    item_count: usize,
}

impl<T: PageToken, I> Window<T, I> {
    /// Creates an empty window. A limit of `0` is treated as `1`.
    pub fn new(max_visible_pages: usize) -> Self {
        if max_visible_pages == 0 {
            pwarn!("Window::new: max_visible_pages must be at least 1; using 1");
        }
        Self {
            pages: VecDeque::new(),
            max_visible_pages: max_visible_pages.max(1),
            item_count: 0,
        }
    }

    pub fn max_visible_pages(&self) -> usize {
        self.max_visible_pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of items across all held pages.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn front(&self) -> Option<&Arc<Page<T, I>>> {
        self.pages.front()
    }

    pub fn back(&self) -> Option<&Arc<Page<T, I>>> {
        self.pages.back()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Page<T, I>>> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<Page<T, I>>> + '_ {
        self.pages.iter()
    }

    pub fn contains_token(&self, token: &T) -> bool {
        self.pages.iter().any(|p| p.token() == token)
    }

    /// The token to request when growing the top edge: the first page's `previous_token`.
    pub fn front_edge_token(&self) -> Option<&T> {
        self.pages.front().and_then(|p| p.previous_token())
    }

    /// The token to request when growing the bottom edge: the last page's `next_token`.
    pub fn back_edge_token(&self) -> Option<&T> {
        self.pages.back().and_then(|p| p.next_token())
    }

    pub fn edge_token(&self, edge: Edge) -> Option<&T> {
        match edge {
            Edge::Top => self.front_edge_token(),
            Edge::Bottom => self.back_edge_token(),
        }
    }

    /// Returns the held pages in order. Only `Arc` handles are cloned.
    pub fn snapshot(&self) -> Vec<Arc<Page<T, I>>> {
        self.pages.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.item_count = 0;
    }

    pub fn insert(
        &mut self,
        edge: Edge,
        page: Page<T, I>,
    ) -> Result<Option<Arc<Page<T, I>>>, PagerError<T>> {
        match edge {
            Edge::Top => self.insert_front(page),
            Edge::Bottom => self.insert_back(page),
        }
    }

    /// Prepends `page`, evicting the last page on overflow.
    ///
    /// On a non-empty window, `page.next_token` must name the current first page and that page's
    /// `previous_token` must name `page`. Returns the evicted page, if any.
    pub fn insert_front(
        &mut self,
        page: Page<T, I>,
    ) -> Result<Option<Arc<Page<T, I>>>, PagerError<T>> {
        self.validate(&page)?;
        if let Some(front) = self.pages.front() {
            check_link(Edge::Top, page.next_token(), front.token())?;
            check_link(Edge::Top, front.previous_token(), page.token())?;
        }

        ptrace!(token = ?page.token(), len = page.len(), "Window::insert_front");
        self.item_count = self.item_count.saturating_add(page.len());
        self.pages.push_front(Arc::new(page));

        if self.pages.len() <= self.max_visible_pages {
            return Ok(None);
        }
        let evicted = self.pages.pop_back();
        if let Some(p) = &evicted {
            self.item_count = self.item_count.saturating_sub(p.len());
            pdebug!(token = ?p.token(), "Window: evicted back page");
        }
        Ok(evicted)
    }

    /// Appends `page`, evicting the first page on overflow.
    ///
    /// On a non-empty window, `page.previous_token` must name the current last page and that
    /// page's `next_token` must name `page`. Returns the evicted page, if any.
    pub fn insert_back(
        &mut self,
        page: Page<T, I>,
    ) -> Result<Option<Arc<Page<T, I>>>, PagerError<T>> {
        self.validate(&page)?;
        if let Some(back) = self.pages.back() {
            check_link(Edge::Bottom, page.previous_token(), back.token())?;
            check_link(Edge::Bottom, back.next_token(), page.token())?;
        }

        ptrace!(token = ?page.token(), len = page.len(), "Window::insert_back");
        self.item_count = self.item_count.saturating_add(page.len());
        self.pages.push_back(Arc::new(page));

        if self.pages.len() <= self.max_visible_pages {
            return Ok(None);
        }
        let evicted = self.pages.pop_front();
        if let Some(p) = &evicted {
            self.item_count = self.item_count.saturating_sub(p.len());
            pdebug!(token = ?p.token(), "Window: evicted front page");
        }
        Ok(evicted)
    }

    fn validate(&self, page: &Page<T, I>) -> Result<(), PagerError<T>> {
        if page.is_empty() {
            return Err(PagerError::EmptyPage {
                token: page.token().clone(),
            });
        }
        if self.contains_token(page.token()) {
            return Err(PagerError::DuplicateToken {
                token: page.token().clone(),
            });
        }
        Ok(())
    }
}

fn check_link<T: PageToken>(
    edge: Edge,
    actual: Option<&T>,
    expected: &T,
) -> Result<(), PagerError<T>> {
    if actual == Some(expected) {
        return Ok(());
    }
    Err(PagerError::InconsistentChain {
        edge,
        expected: Some(expected.clone()),
        actual: actual.cloned(),
    })
}

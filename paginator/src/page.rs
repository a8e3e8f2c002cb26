use alloc::vec::Vec;
use core::fmt;

use crate::Edge;

/// Bound for continuation tokens.
///
/// Tokens are opaque to the engine: it only compares them for equality and clones them into
/// fetch tickets and error reports. The "absent" token is `Option::None`.
pub trait PageToken: Clone + PartialEq + fmt::Debug {}
impl<T: Clone + PartialEq + fmt::Debug> PageToken for T {}

/// One loaded chunk of the dataset plus its continuation tokens.
///
/// A page is immutable once built. After it is committed to a [`crate::Window`] it is shared
/// behind an `Arc`, so views and snapshots never copy item data.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T, I> {
    token: T,
    previous_token: Option<T>,
    next_token: Option<T>,
    items: Vec<I>,
}

impl<T, I> Page<T, I> {
    /// Creates a page with no neighbours (a single-page dataset).
    ///
    /// Use [`Page::with_previous_token`] / [`Page::with_next_token`] to link it.
    pub fn new(token: T, items: Vec<I>) -> Self {
        Self {
            token,
            previous_token: None,
            next_token: None,
            items,
        }
    }

    pub fn with_previous_token(mut self, previous_token: Option<T>) -> Self {
        self.previous_token = previous_token;
        self
    }

    pub fn with_next_token(mut self, next_token: Option<T>) -> Self {
        self.next_token = next_token;
        self
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn previous_token(&self) -> Option<&T> {
        self.previous_token.as_ref()
    }

    pub fn next_token(&self) -> Option<&T> {
        self.next_token.as_ref()
    }

    /// The token to request when extending past this page towards `edge`.
    pub fn edge_token(&self, edge: Edge) -> Option<&T> {
        match edge {
            Edge::Top => self.previous_token(),
            Edge::Bottom => self.next_token(),
        }
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `true` when this is the first page of the dataset.
    pub fn is_first(&self) -> bool {
        self.previous_token.is_none()
    }

    /// `true` when this is the last page of the dataset.
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

impl<T: fmt::Debug, I> fmt::Debug for Page<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("token", &self.token)
            .field("previous_token", &self.previous_token)
            .field("next_token", &self.next_token)
            .field("len", &self.items.len())
            .finish()
    }
}

use alloc::vec::Vec;

use crate::{Edge, EdgeState};

/// A lightweight snapshot of the pager's bookkeeping (no item data).
///
/// Useful for diagnostics and assertions. With `feature = "serde"`, this type implements
/// `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PagerState<T> {
    pub top: EdgeState,
    pub bottom: EdgeState,
    /// Tokens of the held pages, in window order.
    pub page_tokens: Vec<T>,
    pub item_count: usize,
    pub generation: u64,
    pub failed: bool,
}

impl<T> PagerState<T> {
    pub fn edge(&self, edge: Edge) -> EdgeState {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

use crate::Edge;

/// Loader contract violations detected while committing a page.
///
/// Every variant is fatal to the session: once the window can no longer be trusted to hold a
/// contiguous region of the dataset, the pager refuses further work.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PagerError<T> {
    /// The page does not link to the window edge it was loaded for.
    #[error("inconsistent chain on {edge:?} edge: expected {expected:?}, got {actual:?}")]
    InconsistentChain {
        edge: Edge,
        expected: Option<T>,
        actual: Option<T>,
    },
    #[error("page {token:?} is already in the window")]
    DuplicateToken { token: T },
    #[error("page {token:?} has no items")]
    EmptyPage { token: T },
}

use std::time::Duration;

/// Why a fetch did not produce a page.
///
/// Fetch errors are recoverable: the edge goes back to idle and may be triggered again.
#[derive(Debug, thiserror::Error)]
pub enum FetchError<E> {
    #[error("page loader failed: {0}")]
    Loader(#[source] E),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl<E> FetchError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The loader's own error, if the loader failed.
    pub fn loader_error(&self) -> Option<&E> {
        match self {
            Self::Loader(e) => Some(e),
            Self::Timeout(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

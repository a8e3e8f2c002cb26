use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use paginator::{Page, PageToken};

/// The external source of pages.
///
/// `fetch` must be idempotent per token: the session re-requests a token after a failure, and
/// the page returned for a token must link back to its neighbours (the page returned for
/// `page.next_token()` has `previous_token() == Some(page.token())`).
///
/// The loader may run its own fetches concurrently; the session never has more than one fetch
/// per edge outstanding.
#[async_trait]
pub trait PageLoader: Send + Sync + 'static {
    type Token: PageToken + Send + Sync + 'static;
    type Item: Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch(&self, token: Self::Token) -> Result<Page<Self::Token, Self::Item>, Self::Error>;
}

/// A [`PageLoader`] backed by an async closure. See [`loader_fn`].
pub struct FnLoader<F, T> {
    f: F,
    _token: PhantomData<fn(T)>,
}

/// Wraps `f` as a [`PageLoader`].
///
/// ```no_run
/// # use paginator::Page;
/// # use paginator_adapter::loader_fn;
/// let loader = loader_fn(|token: u32| async move {
///     Ok::<_, std::io::Error>(Page::new(token, vec![token]).with_next_token(Some(token + 1)))
/// });
/// ```
pub fn loader_fn<F, Fut, T, I, E>(f: F) -> FnLoader<F, T>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<Page<T, I>, E>>,
{
    FnLoader {
        f,
        _token: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, T, I, E> PageLoader for FnLoader<F, T>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T, I>, E>> + Send + 'static,
    T: PageToken + Send + Sync + 'static,
    I: Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Token = T;
    type Item = I;
    type Error = E;

    async fn fetch(&self, token: T) -> Result<Page<T, I>, E> {
        (self.f)(token).await
    }
}

use std::sync::Arc;
use std::time::Duration;

use paginator::{Completion, Edge, EdgeState, FetchTicket, FlatView, Page, Pager, PagerState};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{FetchError, PageLoader, SessionError, SessionEvent, SessionEvents, SessionOptions};

type LoaderEvent<L> =
    SessionEvent<<L as PageLoader>::Token, <L as PageLoader>::Item, <L as PageLoader>::Error>;

/// The event receiver paired with a [`Session`] over loader `L`.
pub type LoaderEvents<L> =
    SessionEvents<<L as PageLoader>::Token, <L as PageLoader>::Item, <L as PageLoader>::Error>;

type FetchResult<L> = Result<
    Page<<L as PageLoader>::Token, <L as PageLoader>::Item>,
    FetchError<<L as PageLoader>::Error>,
>;

/// A pagination session: a [`Pager`] driven by a [`PageLoader`] on a tokio runtime.
///
/// Triggers never block. Each accepted trigger spawns one fetch task; the two edges may load
/// concurrently, but every commit goes through a single lock, and notifications are queued
/// while that lock is held so the consumer sees them in commit order.
///
/// Dropping the session closes it: in-flight fetches are cancelled and the event stream ends.
///
/// Notifications are queued without bound. A consumer that stops reading [`SessionEvents`]
/// keeps every queued view, and the evicted pages those views share, alive.
pub struct Session<L: PageLoader> {
    shared: Arc<Shared<L>>,
}

struct Shared<L: PageLoader> {
    loader: L,
    handle: Handle,
    fetch_timeout: Option<Duration>,
    inner: Mutex<Inner<L>>,
}

struct Inner<L: PageLoader> {
    pager: Pager<L::Token, L::Item>,
    /// Cancels every fetch of the current generation.
    cancel: CancellationToken,
    /// `None` once the session is closed.
    events: Option<mpsc::UnboundedSender<LoaderEvent<L>>>,
}

impl<L: PageLoader> Inner<L> {
    fn emit(&self, event: LoaderEvent<L>) {
        let Some(tx) = &self.events else {
            return;
        };
        if tx.send(event).is_err() {
            strace!("Session: event receiver dropped");
        }
    }
}

impl<L: PageLoader> Session<L> {
    /// Creates a session that spawns its fetches on the current tokio runtime.
    pub fn new(
        loader: L,
        initial_token: L::Token,
        options: SessionOptions,
    ) -> Result<(Self, LoaderEvents<L>), SessionError> {
        let handle = Handle::try_current()?;
        Ok(Self::with_handle(handle, loader, initial_token, options))
    }

    /// Creates a session that spawns its fetches on `handle`.
    ///
    /// Triggers may then come from any thread, including ones outside the runtime.
    pub fn with_handle(
        handle: Handle,
        loader: L,
        initial_token: L::Token,
        options: SessionOptions,
    ) -> (Self, LoaderEvents<L>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Shared {
            loader,
            handle,
            fetch_timeout: options.fetch_timeout,
            inner: Mutex::new(Inner {
                pager: Pager::new(options.pager, initial_token),
                cancel: CancellationToken::new(),
                events: Some(tx),
            }),
        };
        (
            Self {
                shared: Arc::new(shared),
            },
            SessionEvents::new(rx),
        )
    }

    pub fn loader(&self) -> &L {
        &self.shared.loader
    }

    /// Loads the first page. Does nothing once the window holds pages.
    pub fn bootstrap(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if !inner.pager.window().is_empty() {
            return false;
        }
        self.start(&mut inner, Edge::Bottom)
    }

    /// Reports that the consumer reached `edge` of the current view.
    ///
    /// Returns `true` when a fetch was started. Repeated triggers while the edge is loading,
    /// triggers on an exhausted edge, and triggers on a closed or failed session are ignored.
    pub fn on_edge_reached(&self, edge: Edge) -> bool {
        let mut inner = self.shared.inner.lock();
        self.start(&mut inner, edge)
    }

    pub fn edge_state(&self, edge: Edge) -> EdgeState {
        self.shared.inner.lock().pager.edge_state(edge)
    }

    pub fn state(&self) -> PagerState<L::Token> {
        self.shared.inner.lock().pager.state()
    }

    /// Projects the current window.
    pub fn view(&self) -> FlatView<L::Token, L::Item> {
        self.shared.inner.lock().pager.view()
    }

    /// Drops the window and starts over from `initial_token`.
    ///
    /// In-flight fetches are cancelled, and results that still arrive are ignored. The consumer
    /// receives an empty [`SessionEvent::WindowUpdated`].
    pub fn restart(&self, initial_token: L::Token) {
        let mut inner = self.shared.inner.lock();
        if inner.events.is_none() {
            return;
        }
        inner.cancel.cancel();
        inner.cancel = CancellationToken::new();
        inner.pager.restart(initial_token);
        sdebug!(generation = inner.pager.generation(), "Session::restart");
        let view = inner.pager.view();
        inner.emit(SessionEvent::WindowUpdated(view));
    }

    /// Cancels in-flight fetches and ends the event stream. Further triggers are ignored.
    pub fn close(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.events.take().is_some() {
            inner.cancel.cancel();
            sdebug!("Session::close");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.inner.lock().events.is_none()
    }

    fn start(&self, inner: &mut Inner<L>, edge: Edge) -> bool {
        if inner.events.is_none() {
            return false;
        }
        let Some(ticket) = inner.pager.request_more(edge) else {
            return false;
        };
        strace!(?edge, token = ?ticket.token(), "Session: spawning fetch");
        spawn_fetch(Arc::clone(&self.shared), ticket, inner.cancel.clone());
        true
    }
}

impl<L: PageLoader> Drop for Session<L> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<L: PageLoader> Shared<L> {
    fn commit(&self, ticket: FetchTicket<L::Token>, result: FetchResult<L>) {
        let mut inner = self.inner.lock();
        if inner.events.is_none() {
            return;
        }

        let event = match inner.pager.complete(ticket, result) {
            Ok(Completion::Committed(commit)) => {
                sdebug!(
                    edge = ?commit.edge,
                    token = ?commit.token,
                    items = commit.view.len(),
                    "Session: page committed"
                );
                SessionEvent::WindowUpdated(commit.view)
            }
            Ok(Completion::LoadFailed { edge, token, cause }) => {
                sdebug!(?edge, ?token, "Session: fetch failed");
                SessionEvent::LoadFailed { edge, token, cause }
            }
            Ok(Completion::Stale { .. }) => {
                strace!("Session: stale fetch dropped");
                return;
            }
            Err(error) => {
                swarn!(?error, "Session: loader broke the page chain");
                inner.cancel.cancel();
                SessionEvent::Failed(error)
            }
        };
        inner.emit(event);
    }
}

fn spawn_fetch<L: PageLoader>(
    shared: Arc<Shared<L>>,
    ticket: FetchTicket<L::Token>,
    cancel: CancellationToken,
) {
    let handle = shared.handle.clone();
    handle.spawn(async move {
        let fetch = fetch_page(&shared.loader, ticket.token().clone(), shared.fetch_timeout);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                strace!(edge = ?ticket.edge(), "Session: fetch cancelled");
                return;
            }
            result = fetch => result,
        };
        shared.commit(ticket, result);
    });
}

async fn fetch_page<L: PageLoader>(
    loader: &L,
    token: L::Token,
    timeout: Option<Duration>,
) -> FetchResult<L> {
    let fetch = loader.fetch(token);
    let Some(limit) = timeout else {
        return fetch.await.map_err(FetchError::Loader);
    };
    match tokio::time::timeout(limit, fetch).await {
        Ok(result) => result.map_err(FetchError::Loader),
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}

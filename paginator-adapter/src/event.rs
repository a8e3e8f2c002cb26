use paginator::{Edge, FlatView, PagerError};
use tokio::sync::mpsc;

use crate::FetchError;

/// A notification for the session's consumer.
#[derive(Debug)]
pub enum SessionEvent<T, I, E> {
    /// A page was committed; this is the flattened window after the commit.
    WindowUpdated(FlatView<T, I>),
    /// A fetch failed. The window is unchanged and `edge` may be triggered again.
    LoadFailed {
        edge: Edge,
        token: T,
        cause: FetchError<E>,
    },
    /// The loader broke the page chain. The session ignores all further triggers until it is
    /// restarted.
    Failed(PagerError<T>),
}

/// Receives session notifications.
///
/// Drive it with [`SessionEvents::forward_to`] from a task, or with
/// [`SessionEvents::dispatch_pending`] from a UI frame loop.
pub trait Consumer<T, I, E> {
    fn on_window_updated(&mut self, view: FlatView<T, I>);

    fn on_load_failed(&mut self, edge: Edge, token: T, cause: FetchError<E>);

    fn on_session_failed(&mut self, error: PagerError<T>) {
        let _ = error;
    }
}

/// The receiving half of a session's notification channel.
///
/// Events arrive in commit order. The stream ends once the session is closed and every fetch
/// task has finished.
///
/// The channel is unbounded. Every queued [`SessionEvent::WindowUpdated`] holds its view, and
/// the view holds `Arc`s to its pages, so pages the window has already evicted stay in memory
/// until their events are received. The window limit bounds memory only while the consumer
/// keeps draining this receiver.
#[derive(Debug)]
pub struct SessionEvents<T, I, E> {
    rx: mpsc::UnboundedReceiver<SessionEvent<T, I, E>>,
}

impl<T, I, E> SessionEvents<T, I, E> {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<SessionEvent<T, I, E>>) -> Self {
        Self { rx }
    }

    /// Waits for the next event.
    pub async fn recv(&mut self) -> Option<SessionEvent<T, I, E>> {
        self.rx.recv().await
    }

    /// Returns the next event if one is queued, without waiting.
    pub fn try_recv(&mut self) -> Option<SessionEvent<T, I, E>> {
        self.rx.try_recv().ok()
    }

    /// Blocks the current thread until the next event. Must not be called from async code.
    pub fn blocking_recv(&mut self) -> Option<SessionEvent<T, I, E>> {
        self.rx.blocking_recv()
    }

    /// Delivers every queued event to `consumer` and returns how many were delivered.
    pub fn dispatch_pending(&mut self, consumer: &mut impl Consumer<T, I, E>) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.try_recv() {
            dispatch(consumer, event);
            delivered += 1;
        }
        delivered
    }

    /// Delivers events to `consumer` until the stream ends.
    pub async fn forward_to(&mut self, consumer: &mut impl Consumer<T, I, E>) {
        while let Some(event) = self.recv().await {
            dispatch(consumer, event);
        }
    }
}

fn dispatch<T, I, E>(consumer: &mut impl Consumer<T, I, E>, event: SessionEvent<T, I, E>) {
    match event {
        SessionEvent::WindowUpdated(view) => consumer.on_window_updated(view),
        SessionEvent::LoadFailed { edge, token, cause } => {
            consumer.on_load_failed(edge, token, cause)
        }
        SessionEvent::Failed(error) => consumer.on_session_failed(error),
    }
}

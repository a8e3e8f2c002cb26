use crate::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

const PAGE_SIZE: i64 = 15;

#[derive(Debug, thiserror::Error)]
#[error("source unavailable")]
struct Unavailable;

fn numbered_page(token: i64, first: i64, last: i64) -> Page<i64, i64> {
    let start = token * PAGE_SIZE;
    Page::new(token, (start..start + PAGE_SIZE).collect())
        .with_previous_token((token > first).then(|| token - 1))
        .with_next_token((token < last).then(|| token + 1))
}

/// Serves tokens `first..=last`, counting calls. With a gate, each fetch waits for one permit.
struct NumberedLoader {
    first: i64,
    last: i64,
    calls: AtomicUsize,
    failures: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    delay: Option<Duration>,
    /// Token answered with its successor's page.
    broken: Option<i64>,
}

impl NumberedLoader {
    fn new(first: i64, last: i64) -> Self {
        Self {
            first,
            last,
            calls: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            gate: None,
            delay: None,
            broken: None,
        }
    }

    fn gated(mut self, gate: &Arc<Semaphore>) -> Self {
        self.gate = Some(Arc::clone(gate));
        self
    }

    fn failing(self, failures: usize) -> Self {
        self.failures.store(failures, Ordering::SeqCst);
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn breaking(mut self, token: i64) -> Self {
        self.broken = Some(token);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageLoader for NumberedLoader {
    type Token = i64;
    type Item = i64;
    type Error = Unavailable;

    async fn fetch(&self, token: i64) -> Result<Page<i64, i64>, Unavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.map_err(|_| Unavailable)?.forget();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failures = self.failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.failures.store(failures - 1, Ordering::SeqCst);
            return Err(Unavailable);
        }
        if self.broken == Some(token) {
            return Ok(numbered_page(token + 1, self.first, self.last));
        }
        Ok(numbered_page(token, self.first, self.last))
    }
}

type Events = LoaderEvents<NumberedLoader>;

async fn next_view(events: &mut Events) -> FlatView<i64, i64> {
    match events.recv().await {
        Some(SessionEvent::WindowUpdated(view)) => view,
        other => panic!("expected a window update, got {other:?}"),
    }
}

fn session(loader: NumberedLoader, initial: i64, max_pages: usize) -> (Session<NumberedLoader>, Events) {
    Session::new(
        loader,
        initial,
        SessionOptions::default().with_max_visible_pages(max_pages),
    )
    .unwrap()
}

#[tokio::test]
async fn bottom_triggers_slide_the_window() {
    let (session, mut events) = session(NumberedLoader::new(0, 100), 0, 3);

    assert!(session.bootstrap());
    let view = next_view(&mut events).await;
    assert_eq!(view.len(), 15);
    assert_eq!(view.edge_token(Edge::Bottom), Some(&1));

    for _ in 0..3 {
        assert!(session.on_edge_reached(Edge::Bottom));
        next_view(&mut events).await;
    }

    let view = session.view();
    assert_eq!(view.len(), 45);
    assert_eq!(*view[0].item(), 15);
    assert_eq!(session.state().page_tokens, [1, 2, 3]);
    assert_eq!(session.loader().calls(), 4);
    assert!(!session.bootstrap());
}

#[tokio::test]
async fn repeated_triggers_while_loading_fetch_once() {
    let gate = Arc::new(Semaphore::new(0));
    let (session, mut events) = session(NumberedLoader::new(0, 100).gated(&gate), 0, 5);

    assert!(session.bootstrap());
    assert!(!session.on_edge_reached(Edge::Bottom));
    assert!(!session.on_edge_reached(Edge::Top));
    gate.add_permits(1);
    next_view(&mut events).await;

    assert!(session.on_edge_reached(Edge::Bottom));
    for _ in 0..3 {
        assert!(!session.on_edge_reached(Edge::Bottom));
        tokio::task::yield_now().await;
    }
    assert_eq!(session.edge_state(Edge::Bottom), EdgeState::Loading);

    gate.add_permits(1);
    let view = next_view(&mut events).await;
    assert_eq!(view.len(), 30);
    assert_eq!(session.loader().calls(), 2);
    assert_eq!(session.edge_state(Edge::Bottom), EdgeState::Idle);
}

#[tokio::test]
async fn top_of_dataset_exhausts_without_fetching() {
    let (session, mut events) = session(NumberedLoader::new(0, 100), 0, 3);
    session.bootstrap();
    next_view(&mut events).await;

    assert!(!session.on_edge_reached(Edge::Top));
    assert_eq!(session.edge_state(Edge::Top), EdgeState::Exhausted);
    assert!(!session.on_edge_reached(Edge::Top));
    assert_eq!(session.loader().calls(), 1);
}

#[tokio::test]
async fn load_failure_is_reported_and_retry_succeeds() {
    let (session, mut events) = session(NumberedLoader::new(0, 100), 0, 3);
    session.bootstrap();
    next_view(&mut events).await;

    session.loader().failures.store(1, Ordering::SeqCst);
    assert!(session.on_edge_reached(Edge::Bottom));
    match events.recv().await {
        Some(SessionEvent::LoadFailed { edge, token, cause }) => {
            assert_eq!(edge, Edge::Bottom);
            assert_eq!(token, 1);
            assert!(cause.loader_error().is_some());
        }
        other => panic!("expected a load failure, got {other:?}"),
    }
    assert_eq!(session.edge_state(Edge::Bottom), EdgeState::Idle);
    assert_eq!(session.state().page_tokens, [0]);

    assert!(session.on_edge_reached(Edge::Bottom));
    let view = next_view(&mut events).await;
    assert_eq!(view.len(), 30);
    assert_eq!(session.state().page_tokens, [0, 1]);
}

#[tokio::test]
async fn both_edges_load_concurrently() {
    let gate = Arc::new(Semaphore::new(1));
    let (session, mut events) = session(NumberedLoader::new(0, 100).gated(&gate), 5, 5);
    session.bootstrap();
    next_view(&mut events).await;

    assert!(session.on_edge_reached(Edge::Top));
    assert!(session.on_edge_reached(Edge::Bottom));
    assert_eq!(session.edge_state(Edge::Top), EdgeState::Loading);
    assert_eq!(session.edge_state(Edge::Bottom), EdgeState::Loading);

    gate.add_permits(2);
    next_view(&mut events).await;
    let view = next_view(&mut events).await;
    assert_eq!(view.len(), 45);
    assert_eq!(session.state().page_tokens, [4, 5, 6]);
    assert_eq!(session.loader().calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_times_out() {
    let loader = NumberedLoader::new(0, 100).delayed(Duration::from_secs(10));
    let options = SessionOptions::default().with_fetch_timeout(Some(Duration::from_secs(1)));
    let (session, mut events) = Session::new(loader, 0, options).unwrap();

    assert!(session.bootstrap());
    match events.recv().await {
        Some(SessionEvent::LoadFailed { edge, token, cause }) => {
            assert_eq!(edge, Edge::Bottom);
            assert_eq!(token, 0);
            assert!(cause.is_timeout());
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert!(session.view().is_empty());
    assert_eq!(session.edge_state(Edge::Top), EdgeState::Idle);
    assert_eq!(session.edge_state(Edge::Bottom), EdgeState::Idle);
}

#[tokio::test]
async fn broken_chain_fails_the_session() {
    let loader = loader_fn(|token: i64| async move {
        Ok::<_, Unavailable>(numbered_page(token + 1, 0, 100))
    });
    let (session, mut events) = Session::new(loader, 0, SessionOptions::default()).unwrap();

    session.bootstrap();
    match events.recv().await {
        Some(SessionEvent::Failed(PagerError::InconsistentChain {
            expected, actual, ..
        })) => {
            assert_eq!(expected, Some(0));
            assert_eq!(actual, Some(1));
        }
        other => panic!("expected a fatal error, got {other:?}"),
    }
    assert!(session.state().failed);
    assert!(!session.on_edge_reached(Edge::Bottom));
    assert!(!session.bootstrap());
}

#[tokio::test]
async fn restart_drops_in_flight_fetches() {
    let gate = Arc::new(Semaphore::new(0));
    let (session, mut events) = session(NumberedLoader::new(0, 100).gated(&gate), 0, 3);

    assert!(session.bootstrap());
    session.restart(50);
    assert!(next_view(&mut events).await.is_empty());
    assert_eq!(session.state().generation, 1);

    assert!(session.bootstrap());
    gate.add_permits(1);
    let view = next_view(&mut events).await;
    assert_eq!(*view.first().unwrap().page_token(), 50);
    assert_eq!(session.state().page_tokens, [50]);
}

#[tokio::test]
async fn close_ends_the_event_stream() {
    let (session, mut events) = session(NumberedLoader::new(0, 100), 0, 3);
    session.bootstrap();
    next_view(&mut events).await;

    session.close();
    assert!(session.is_closed());
    assert!(!session.on_edge_reached(Edge::Bottom));
    assert!(events.recv().await.is_none());
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn close_cancels_the_pending_fetch() {
    let gate = Arc::new(Semaphore::new(1));
    let (session, mut events) = session(NumberedLoader::new(0, 100).gated(&gate), 0, 3);
    session.bootstrap();
    next_view(&mut events).await;

    assert!(session.on_edge_reached(Edge::Bottom));
    settle().await;
    assert_eq!(session.loader().calls(), 2);

    session.close();
    gate.add_permits(1);
    settle().await;

    // The cancelled fetch never took the permit and nothing was committed.
    assert_eq!(gate.available_permits(), 1);
    assert!(events.recv().await.is_none());
    assert_eq!(session.state().page_tokens, [0]);
}

#[tokio::test]
async fn dropping_the_session_cancels_the_pending_fetch() {
    let gate = Arc::new(Semaphore::new(1));
    let (session, mut events) = session(NumberedLoader::new(0, 100).gated(&gate), 0, 3);
    session.bootstrap();
    next_view(&mut events).await;

    assert!(session.on_edge_reached(Edge::Bottom));
    drop(session);
    gate.add_permits(1);
    settle().await;

    assert_eq!(gate.available_permits(), 1);
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn fatal_error_cancels_the_other_edge() {
    let gate = Arc::new(Semaphore::new(1));
    let loader = NumberedLoader::new(0, 100).gated(&gate).breaking(4);
    let (session, mut events) = session(loader, 5, 5);
    session.bootstrap();
    next_view(&mut events).await;

    assert!(session.on_edge_reached(Edge::Top));
    assert!(session.on_edge_reached(Edge::Bottom));
    settle().await;
    assert_eq!(session.loader().calls(), 3);

    // The semaphore is fair, so the top fetch gets the first permit.
    gate.add_permits(1);
    match events.recv().await {
        Some(SessionEvent::Failed(PagerError::InconsistentChain { edge, .. })) => {
            assert_eq!(edge, Edge::Top);
        }
        other => panic!("expected a fatal error, got {other:?}"),
    }

    gate.add_permits(1);
    settle().await;
    assert_eq!(gate.available_permits(), 1);
    assert!(events.try_recv().is_none());
    assert_eq!(session.state().page_tokens, [5]);
    assert!(session.state().failed);
}

#[tokio::test]
async fn fetch_whose_base_page_was_evicted_is_dropped_silently() {
    let gate = Arc::new(Semaphore::new(1));
    let (session, mut events) = session(NumberedLoader::new(0, 100).gated(&gate), 5, 1);
    session.bootstrap();
    next_view(&mut events).await;

    assert!(session.on_edge_reached(Edge::Top));
    assert!(session.on_edge_reached(Edge::Bottom));
    settle().await;

    gate.add_permits(1);
    let view = next_view(&mut events).await;
    assert_eq!(*view[0].page_token(), 4);

    // Page 6 extended page 5, which the top commit evicted.
    gate.add_permits(1);
    while session.edge_state(Edge::Bottom).is_loading() {
        tokio::task::yield_now().await;
    }
    assert_eq!(session.edge_state(Edge::Bottom), EdgeState::Idle);
    assert!(events.try_recv().is_none());
    assert_eq!(session.state().page_tokens, [4]);
    assert!(!session.state().failed);

    assert!(session.on_edge_reached(Edge::Bottom));
    gate.add_permits(1);
    let view = next_view(&mut events).await;
    assert_eq!(*view[0].page_token(), 5);
    assert_eq!(session.loader().calls(), 4);
}

struct ScrollingConsumer<'a> {
    session: &'a Session<NumberedLoader>,
    lens: Vec<usize>,
    failures: Vec<(Edge, i64)>,
}

impl Consumer<i64, i64, Unavailable> for ScrollingConsumer<'_> {
    fn on_window_updated(&mut self, view: FlatView<i64, i64>) {
        self.lens.push(view.len());
        // Keep scrolling down until the dataset ends.
        if view.edge_token(Edge::Bottom).is_some() {
            self.session.on_edge_reached(Edge::Bottom);
        } else {
            self.session.close();
        }
    }

    fn on_load_failed(&mut self, edge: Edge, token: i64, _cause: FetchError<Unavailable>) {
        self.failures.push((edge, token));
        self.session.on_edge_reached(edge);
    }
}

#[tokio::test]
async fn consumer_drives_the_session_to_the_end() {
    let (session, mut events) = session(NumberedLoader::new(0, 3).failing(1), 0, 10);
    let mut consumer = ScrollingConsumer {
        session: &session,
        lens: Vec::new(),
        failures: Vec::new(),
    };

    session.bootstrap();
    events.forward_to(&mut consumer).await;

    assert_eq!(consumer.lens, [15, 30, 45, 60]);
    assert_eq!(consumer.failures, [(Edge::Bottom, 0)]);
    assert_eq!(session.loader().calls(), 5);
}

#[derive(Default)]
struct Recorder {
    views: Vec<usize>,
}

impl Consumer<i64, i64, Unavailable> for Recorder {
    fn on_window_updated(&mut self, view: FlatView<i64, i64>) {
        self.views.push(view.len());
    }

    fn on_load_failed(&mut self, _edge: Edge, _token: i64, _cause: FetchError<Unavailable>) {}
}

#[tokio::test]
async fn dispatch_pending_delivers_queued_events() {
    let (session, mut events) = session(NumberedLoader::new(0, 100), 0, 3);
    let mut recorder = Recorder::default();
    assert_eq!(events.dispatch_pending(&mut recorder), 0);

    session.bootstrap();
    while session.state().page_tokens.is_empty() {
        tokio::task::yield_now().await;
    }
    assert_eq!(events.dispatch_pending(&mut recorder), 1);
    assert_eq!(events.dispatch_pending(&mut recorder), 0);
    assert_eq!(recorder.views, [15]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn triggers_may_come_from_outside_the_runtime() {
    let handle = tokio::runtime::Handle::current();
    let (session, mut events) = Session::with_handle(
        handle,
        NumberedLoader::new(0, 100),
        0,
        SessionOptions::default(),
    );

    let started = std::thread::scope(|s| s.spawn(|| session.bootstrap()).join().unwrap());
    assert!(started);
    let view = next_view(&mut events).await;
    assert_eq!(view.len(), 15);
}

#[test]
fn session_needs_a_runtime() {
    let result = Session::new(NumberedLoader::new(0, 1), 0, SessionOptions::default());
    assert!(matches!(result, Err(SessionError::NoRuntime(_))));
}

use alloc::sync::Arc;

use crate::projector::project;
use crate::{Edge, EdgeState, FlatView, Page, PageToken, PagerError, PagerOptions, PagerState, Window};

/// What a [`FetchTicket`] asks the loader for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    /// The first page of the session. Both edges wait on it.
    Bootstrap,
    /// The page beyond the current window edge.
    Extend,
}

/// A fetch the driver must perform on behalf of the [`Pager`].
///
/// Hand the ticket back to [`Pager::complete`] together with the loader's result. A ticket
/// completes at most once; the pager only honours the ticket it last issued for an edge.
#[derive(Debug)]
pub struct FetchTicket<T> {
    edge: Edge,
    token: T,
    kind: FetchKind,
    generation: u64,
    sequence: u64,
}

impl<T> FetchTicket<T> {
    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// The token to pass to the loader.
    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn duplicate(&self) -> Self
    where
        T: Clone,
    {
        Self {
            edge: self.edge,
            token: self.token.clone(),
            kind: self.kind,
            generation: self.generation,
            sequence: self.sequence,
        }
    }
}

/// A page that was committed to the window.
#[derive(Clone, Debug)]
pub struct Commit<T, I> {
    pub edge: Edge,
    pub token: T,
    /// The page dropped from the opposite end, if the window overflowed.
    pub evicted: Option<Arc<Page<T, I>>>,
    /// The opposite edge, if the eviction moved it off the end of the dataset.
    pub reopened: Option<Edge>,
    /// The flattened window after the commit.
    pub view: FlatView<T, I>,
}

/// The result of handing a finished fetch back to the [`Pager`].
#[derive(Clone, Debug)]
pub enum Completion<T, I, E> {
    Committed(Commit<T, I>),
    /// The loader failed. The window is unchanged and the edge is idle again.
    LoadFailed { edge: Edge, token: T, cause: E },
    /// The result no longer applies and was dropped: the session was reset or failed, the ticket
    /// is not the edge's outstanding fetch, or the edge it extended was evicted meanwhile.
    Stale { edge: Edge },
}

/// The per-edge fetch coordinator.
///
/// `Pager` is a synchronous state machine; it never performs I/O. A driver (see the
/// `paginator-adapter` crate) calls [`Pager::request_more`] when the consumer reaches an edge,
/// runs the returned [`FetchTicket`] through a page loader, and passes the outcome to
/// [`Pager::complete`]. Because a ticket is only issued for an `Idle` edge, at most one fetch
/// per edge is ever outstanding, while the two edges may load concurrently.
#[derive(Clone, Debug)]
pub struct Pager<T, I> {
    options: PagerOptions,
    initial_token: T,
    window: Window<T, I>,
    top: EdgeState,
    bottom: EdgeState,
    generation: u64,
    failed: bool,
    sequence: u64,
    /// Sequence of the outstanding ticket per edge.
    top_fetch: Option<u64>,
    bottom_fetch: Option<u64>,
}

impl<T: PageToken, I> Pager<T, I> {
    /// Creates a pager whose first page is loaded from `initial_token`.
    pub fn new(options: PagerOptions, initial_token: T) -> Self {
        pdebug!(
            max_visible_pages = options.max_visible_pages,
            bidirectional = options.bidirectional,
            "Pager::new"
        );
        let mut pager = Self {
            window: Window::new(options.max_visible_pages),
            options,
            initial_token,
            top: EdgeState::Idle,
            bottom: EdgeState::Idle,
            generation: 0,
            failed: false,
            sequence: 0,
            top_fetch: None,
            bottom_fetch: None,
        };
        pager.reset_edges();
        pager
    }

    pub fn options(&self) -> &PagerOptions {
        &self.options
    }

    pub fn initial_token(&self) -> &T {
        &self.initial_token
    }

    pub fn window(&self) -> &Window<T, I> {
        &self.window
    }

    pub fn edge_state(&self, edge: Edge) -> EdgeState {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    /// Bumped by every reset; tickets from older generations are ignored.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` once a loader contract violation has been committed.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Projects the current window.
    pub fn view(&self) -> FlatView<T, I> {
        project(self.window.iter())
    }

    pub fn state(&self) -> PagerState<T> {
        PagerState {
            top: self.top,
            bottom: self.bottom,
            page_tokens: self.window.iter().map(|p| p.token().clone()).collect(),
            item_count: self.window.item_count(),
            generation: self.generation,
            failed: self.failed,
        }
    }

    /// Starts a new session from the same initial token.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.window.clear();
        self.failed = false;
        self.reset_edges();
        pdebug!(generation = self.generation, "Pager::reset");
    }

    /// Starts a new session from `initial_token`.
    pub fn restart(&mut self, initial_token: T) {
        self.initial_token = initial_token;
        self.reset();
    }

    /// Asks for one more page at `edge`.
    ///
    /// Returns a ticket when a fetch must be started, or `None` when the request is a no-op:
    /// the edge is already loading, the edge is exhausted, top loading is disabled, or the
    /// session failed. Reaching the end of the dataset marks the edge exhausted.
    ///
    /// On an empty window the ticket bootstraps the session from the initial token, and both
    /// edges wait for it.
    pub fn request_more(&mut self, edge: Edge) -> Option<FetchTicket<T>> {
        if self.failed {
            ptrace!(?edge, "request_more: session failed");
            return None;
        }
        if edge == Edge::Top && !self.options.bidirectional {
            return None;
        }
        let state = self.edge_state(edge);
        if state != EdgeState::Idle {
            ptrace!(?edge, ?state, "request_more: ignored");
            return None;
        }

        if self.window.is_empty() {
            let sequence = self.next_sequence();
            for e in Edge::ALL {
                if self.edge_state(e).is_idle() {
                    self.set_edge_state(e, EdgeState::Loading);
                    self.set_outstanding(e, Some(sequence));
                }
            }
            pdebug!(?edge, token = ?self.initial_token, "request_more: bootstrap");
            return Some(FetchTicket {
                edge,
                token: self.initial_token.clone(),
                kind: FetchKind::Bootstrap,
                generation: self.generation,
                sequence,
            });
        }

        let Some(token) = self.window.edge_token(edge).cloned() else {
            pdebug!(?edge, "request_more: edge exhausted");
            self.set_edge_state(edge, EdgeState::Exhausted);
            return None;
        };
        pdebug!(?edge, ?token, "request_more: fetch");
        let sequence = self.next_sequence();
        self.set_edge_state(edge, EdgeState::Loading);
        self.set_outstanding(edge, Some(sequence));
        Some(FetchTicket {
            edge,
            token,
            kind: FetchKind::Extend,
            generation: self.generation,
            sequence,
        })
    }

    /// Commits the outcome of a fetch started by [`Pager::request_more`].
    ///
    /// Loader failures are recoverable: they come back as [`Completion::LoadFailed`] and the edge
    /// may be requested again. An `Err` means the loader broke the page chain contract; the
    /// pager is then failed and ignores all further requests until reset.
    pub fn complete<E>(
        &mut self,
        ticket: FetchTicket<T>,
        result: Result<Page<T, I>, E>,
    ) -> Result<Completion<T, I, E>, PagerError<T>> {
        let edge = ticket.edge;
        if ticket.generation != self.generation || self.failed {
            ptrace!(?edge, token = ?ticket.token, "complete: stale ticket");
            return Ok(Completion::Stale { edge });
        }
        if self.outstanding(edge) != Some(ticket.sequence) {
            ptrace!(?edge, token = ?ticket.token, "complete: ticket already completed");
            return Ok(Completion::Stale { edge });
        }

        let page = match result {
            Ok(page) => page,
            Err(cause) => {
                pdebug!(?edge, token = ?ticket.token, "complete: load failed");
                self.finish(&ticket);
                return Ok(Completion::LoadFailed {
                    edge,
                    token: ticket.token,
                    cause,
                });
            }
        };

        if page.token() != &ticket.token {
            return Err(self.fail(PagerError::InconsistentChain {
                edge,
                expected: Some(ticket.token),
                actual: Some(page.token().clone()),
            }));
        }

        if ticket.kind == FetchKind::Extend && self.window.edge_token(edge) != Some(&ticket.token) {
            pdebug!(?edge, token = ?ticket.token, "complete: anchor evicted while loading");
            self.finish(&ticket);
            return Ok(Completion::Stale { edge });
        }

        let evicted = match self.window.insert(edge, page) {
            Ok(evicted) => evicted,
            Err(err) => return Err(self.fail(err)),
        };
        self.finish(&ticket);

        let opposite = edge.opposite();
        let reopened = if evicted.is_some()
            && self.edge_state(opposite).is_exhausted()
            && self.window.edge_token(opposite).is_some()
            && (opposite == Edge::Bottom || self.options.bidirectional)
        {
            self.set_edge_state(opposite, EdgeState::Idle);
            Some(opposite)
        } else {
            None
        };

        pdebug!(
            ?edge,
            token = ?ticket.token,
            pages = self.window.len(),
            items = self.window.item_count(),
            evicted = evicted.is_some(),
            "complete: committed"
        );
        Ok(Completion::Committed(Commit {
            edge,
            token: ticket.token,
            evicted,
            reopened,
            view: self.view(),
        }))
    }

    fn finish(&mut self, ticket: &FetchTicket<T>) {
        for e in Edge::ALL {
            if self.outstanding(e) == Some(ticket.sequence) {
                self.set_outstanding(e, None);
                self.set_edge_state(e, EdgeState::Idle);
            }
        }
    }

    fn fail(&mut self, err: PagerError<T>) -> PagerError<T> {
        pwarn!(error = ?err, "Pager: loader broke the page chain; session failed");
        self.failed = true;
        err
    }

    fn reset_edges(&mut self) {
        self.top_fetch = None;
        self.bottom_fetch = None;
        self.bottom = EdgeState::Idle;
        self.top = if self.options.bidirectional {
            EdgeState::Idle
        } else {
            EdgeState::Exhausted
        };
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        sequence
    }

    fn outstanding(&self, edge: Edge) -> Option<u64> {
        match edge {
            Edge::Top => self.top_fetch,
            Edge::Bottom => self.bottom_fetch,
        }
    }

    fn set_outstanding(&mut self, edge: Edge, sequence: Option<u64>) {
        match edge {
            Edge::Top => self.top_fetch = sequence,
            Edge::Bottom => self.bottom_fetch = sequence,
        }
    }

    fn set_edge_state(&mut self, edge: Edge, state: EdgeState) {
        match edge {
            Edge::Top => self.top = state,
            Edge::Bottom => self.bottom = state,
        }
    }
}

//! A headless bidirectional windowed pagination engine.
//!
//! For an async driver built on tokio (page loaders, sessions, consumer notifications), see the
//! `paginator-adapter` crate.
//!
//! This crate holds the state that makes infinite lists hard to get right:
//! - a bounded window of token-linked pages, evicting from the far end as either end grows
//! - a per-edge fetch state machine that keeps at most one fetch in flight per edge
//! - a flattened, page-annotated view of the window for the rendering layer
//!
//! It is UI-agnostic and executor-agnostic. The caller is expected to provide:
//! - edge triggers (the user scrolled near the top or bottom)
//! - a way to run fetches and report their outcome
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod error;
mod options;
mod page;
mod pager;
mod projector;
mod state;
mod types;
mod window;


pub use anchor::ItemAnchor;
pub use error::PagerError;
pub use options::{DEFAULT_MAX_VISIBLE_PAGES, PagerOptions};
pub use page::{Page, PageToken};
pub use pager::{Commit, Completion, FetchKind, FetchTicket, Pager};
pub use projector::{FlatItem, FlatView, project};
pub use state::PagerState;
pub use types::{Edge, EdgeState};
pub use window::Window;

//! Async driver for the `paginator` crate.
//!
//! The `paginator` crate is executor-agnostic: it decides *which* page to fetch and how to
//! commit it. This crate runs those fetches on tokio:
//!
//! - [`PageLoader`]: the async source of pages (or [`loader_fn`] for a closure)
//! - [`Session`]: edge triggers in, one task per fetch, commits serialized behind one lock
//! - [`SessionEvents`] / [`Consumer`]: window updates and load failures, in commit order
//!
//! Fetches can be bounded with a timeout and are cancelled on restart, close, or a fatal
//! loader error.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod error;
mod event;
mod loader;
mod options;
mod session;

#[cfg(test)]
mod tests;

pub use error::{FetchError, SessionError};
pub use event::{Consumer, SessionEvent, SessionEvents};
pub use loader::{FnLoader, PageLoader, loader_fn};
pub use options::SessionOptions;
pub use session::{LoaderEvents, Session};

pub use paginator::{
    Edge, EdgeState, FlatItem, FlatView, ItemAnchor, Page, PagerError, PagerOptions,
};

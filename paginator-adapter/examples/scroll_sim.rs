// Example: a simulated user scrolling through a token-paged feed in both directions.
//
// Run with `RUST_LOG=paginator=debug,paginator_adapter=debug` and `--features tracing` to see
// the state machine at work.
use std::convert::Infallible;
use std::time::Duration;

use paginator_adapter::{
    Edge, Page, PagerOptions, Session, SessionEvent, SessionOptions, loader_fn,
};
use tracing_subscriber::EnvFilter;

const PAGE_SIZE: i32 = 15;
const MAX_PAGES: i32 = 100;
const MAX_PAGES_VISIBLE: usize = 5;

fn synthetic_page(token: i32) -> Page<i32, i32> {
    let start = token * PAGE_SIZE;
    Page::new(token, (start..start + PAGE_SIZE).collect())
        .with_previous_token((token > -MAX_PAGES).then(|| token - 1))
        .with_next_token((token < MAX_PAGES).then(|| token + 1))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let loader = loader_fn(|token: i32| async move {
        // Synthetic pause before data load.
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok::<_, Infallible>(synthetic_page(token))
    });
    let options = SessionOptions::new(PagerOptions::new(MAX_PAGES_VISIBLE))
        .with_fetch_timeout(Some(Duration::from_secs(2)));
    let (session, mut events) =
        Session::new(loader, 0, options).expect("called inside a tokio runtime");

    session.bootstrap();

    // Scroll to the bottom eight times, then back up twelve times. A real UI would fire these
    // from its scroll listener whenever the first/last row becomes visible.
    let plan = std::iter::repeat_n(Edge::Bottom, 8).chain(std::iter::repeat_n(Edge::Top, 12));
    for edge in std::iter::once(None).chain(plan.map(Some)) {
        if let Some(edge) = edge {
            // Mashing the trigger while a fetch is in flight is harmless.
            let started = session.on_edge_reached(edge);
            let duplicate = session.on_edge_reached(edge);
            println!("reached {edge:?}: started={started} duplicate_started={duplicate}");
            if !started {
                continue;
            }
        }

        match events.recv().await {
            Some(SessionEvent::WindowUpdated(view)) => {
                let first = view.first().map(|it| *it.item());
                let last = view.last().map(|it| *it.item());
                println!(
                    "  window pages={:?} items={} first={first:?} last={last:?}",
                    session.state().page_tokens,
                    view.len()
                );
            }
            Some(SessionEvent::LoadFailed { edge, token, cause }) => {
                println!("  load of page {token} at {edge:?} failed: {cause}");
            }
            Some(SessionEvent::Failed(error)) => {
                println!("  session failed: {error}");
                break;
            }
            None => break,
        }
    }

    session.close();
}

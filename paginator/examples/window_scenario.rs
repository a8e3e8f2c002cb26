// Example: driving the pager state machine by hand, with an in-memory source.
use paginator::{Completion, Edge, Page, Pager, PagerOptions};

const PAGE_SIZE: i64 = 15;

fn page(token: i64) -> Page<i64, i64> {
    let start = token * PAGE_SIZE;
    Page::new(token, (start..start + PAGE_SIZE).collect())
        .with_previous_token((token > 0).then(|| token - 1))
        .with_next_token((token < 100).then(|| token + 1))
}

fn main() {
    let mut pager = Pager::new(PagerOptions::new(3), 0i64);

    // The first trigger on an empty window bootstraps from the initial token. A real driver
    // would run the ticket through a loader on some executor; here the source is synchronous.
    for _ in 0..4 {
        let Some(ticket) = pager.request_more(Edge::Bottom) else {
            continue;
        };
        let token = *ticket.token();
        match pager.complete::<()>(ticket, Ok(page(token))) {
            Ok(Completion::Committed(commit)) => println!(
                "loaded page {} evicted={:?} items={}",
                commit.token,
                commit.evicted.map(|p| *p.token()),
                commit.view.len()
            ),
            other => println!("unexpected completion: {other:?}"),
        }
    }

    // Page 0 was evicted, but page 1 still points at it.
    println!("state={:?}", pager.state());
    println!("front_edge_token={:?}", pager.window().front_edge_token());

    let view = pager.view();
    if let Some(first) = view.first() {
        println!(
            "first item={} page={} previous_token={:?}",
            first.item(),
            first.page_token(),
            first.previous_token()
        );
    }
}

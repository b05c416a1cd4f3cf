// ── Pagination collector ──
//
// Drains a paged list operation into one eager Vec. The collector knows
// nothing about the wire format: the fetch closure turns a cursor into a
// page and decides what the next cursor is.

use std::future::Future;

use tracing::debug;

/// Where the next page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// First page, no cursor parameter sent.
    Start,
    /// Zero-based item offset.
    Offset(u64),
    /// Opaque continuation token (`start`, `pagetoken`).
    Token(String),
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` on the last page.
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Fetch every page, starting at [`Cursor::Start`], and concatenate the
/// items in page order.
///
/// The first failing page aborts the run; items already gathered are
/// dropped. A page that hands back the cursor it was fetched with ends the
/// run as well, so a misbehaving server cannot loop us forever.
pub async fn collect_pages<T, E, F, Fut>(mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Cursor) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut all = Vec::new();
    let mut cursor = Cursor::Start;
    let mut pages = 0_usize;

    loop {
        let page = fetch(cursor.clone()).await?;
        pages += 1;
        all.extend(page.items);

        match page.next {
            Some(next) if next != cursor => cursor = next,
            _ => break,
        }
    }

    debug!(pages, items = all.len(), "collected pages");
    Ok(all)
}

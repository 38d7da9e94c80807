//! Marker-based pagination.
//!
//! Paged queries return a batch plus an opaque continuation marker; the
//! helper here drives the fetch loop until the marker disappears, repeats,
//! or a fetch fails. A repeated marker is treated as the end of the
//! collection rather than retried, so a confused node cannot loop the
//! client forever.

use std::future::Future;

use tracing::{debug, warn};

use tideway_proto::Marker;

use crate::error::CallError;

/// One batch of a paged query.
#[derive(Debug)]
pub struct Page<T> {
    /// Items in this batch.
    pub items: Vec<T>,
    /// Continuation marker; `None` means the collection is exhausted.
    pub marker: Option<Marker>,
}

/// Fetch every page of a marker-paginated collection.
///
/// `fetch` is called with `None` first, then with each continuation marker.
/// A fetch error ends the loop and returns the items gathered so far; paged
/// queries degrade to partial results rather than failing wholesale.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Vec<T>
where
    F: FnMut(Option<Marker>) -> Fut,
    Fut: Future<Output = Result<Page<T>, CallError>>,
{
    let mut items = Vec::new();
    let mut marker: Option<Marker> = None;

    loop {
        match fetch(marker.clone()).await {
            Ok(page) => {
                items.extend(page.items);
                match page.marker {
                    Some(next) if marker.as_ref() != Some(&next) => marker = Some(next),
                    Some(_) => {
                        debug!("marker repeated, ending pagination");
                        break;
                    }
                    None => break,
                }
            }
            Err(error) => {
                warn!(%error, fetched = items.len(), "page fetch failed, returning partial result");
                break;
            }
        }
    }

    items
}

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::clients::{PlacesApi, RESTAURANT_PLACE_TYPE};
use crate::error::RemoteError;
use crate::helpers::retry::{with_retry, RetryPolicy};
use crate::models::places::PlaceCandidate;
use crate::models::query::SearchQuery;

/// Delay the provider needs before a continuation token becomes valid.
pub const PAGE_DELAY: Duration = Duration::from_secs(2);

enum Cursor {
    First,
    Next(String),
    Done,
}

/// Paginated nearby search over a [`PlacesApi`].
///
/// Pages are fetched lazily: a continuation is only requested once the
/// consumer has drained the previous page, and always after `page_delay`.
#[derive(Clone)]
pub struct NearbySearch {
    places: Arc<dyn PlacesApi>,
    retry: RetryPolicy,
    page_delay: Duration,
}

impl NearbySearch {
    /// `page_delay` is raised to [`PAGE_DELAY`] when shorter.
    pub fn new(places: Arc<dyn PlacesApi>, retry: RetryPolicy, page_delay: Duration) -> Self {
        Self {
            places,
            retry,
            page_delay: page_delay.max(PAGE_DELAY),
        }
    }

    /// Candidates in provider order. The stream ends when a page carries no
    /// continuation token; no dedup, sorting or filtering is applied.
    pub fn candidates<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> BoxStream<'a, Result<PlaceCandidate, RemoteError>> {
        stream::try_unfold(Cursor::First, move |cursor| async move {
            let page = match cursor {
                Cursor::Done => return Ok(None),
                Cursor::First => {
                    with_retry(self.retry, "nearby search", || {
                        self.places.nearby_search(
                            query.center,
                            query.radius_meters,
                            RESTAURANT_PLACE_TYPE,
                            query.keyword.as_deref(),
                        )
                    })
                    .await?
                }
                Cursor::Next(token) => {
                    tokio::time::sleep(self.page_delay).await;
                    with_retry(self.retry, "places page continuation", || {
                        self.places.continue_page(&token)
                    })
                    .await?
                }
            };

            debug!("Fetched {} places", page.results.len());
            let next = match page.next_page_token {
                Some(token) => Cursor::Next(token),
                None => Cursor::Done,
            };
            let candidates = page.results.into_iter().map(Ok::<PlaceCandidate, RemoteError>);
            Ok::<_, RemoteError>(Some((stream::iter(candidates), next)))
        })
        .try_flatten()
        .boxed()
    }
}

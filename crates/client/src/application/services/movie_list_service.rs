//! Movie list service: query parameters, view state, and the sequence gate
//!
//! Owns the mutable `QueryParams` and the derived view state, and decides
//! when to invoke the query port. Parameter changes and push-triggered
//! refreshes funnel into one refetch path guarded by a monotonic sequence
//! number: only the attempt that is still the newest issued one when it
//! completes may mutate the view, so overlapping fetches that finish out
//! of order cannot clobber fresher data.

use std::sync::Arc;

use tokio::sync::Mutex;

use kinoview_protocol::{Movie, QueryParams, QueryParamsUpdate};

use crate::ports::outbound::{MovieQueryPort, QueryError};

/// Derived state of the list view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub movies: Vec<Movie>,
    pub total_count: u64,
    pub loading: bool,
    /// Last fetch failure; previous `movies`/`total_count` are retained
    /// (stale-but-valid beats a blank view)
    pub error: Option<QueryError>,
}

/// One issued refetch: its sequence number is the sole arbiter of recency
struct FetchAttempt {
    seq: u64,
    params: QueryParams,
}

struct ListInner {
    params: QueryParams,
    view: ViewState,
    next_seq: u64,
    latest_issued: u64,
}

/// Controller for the paginated movie list
///
/// Cloning shares the same state; callbacks and tasks can hold cheap
/// clones. All view mutation happens inside the fetch-completion path
/// under the state lock.
#[derive(Clone)]
pub struct MovieListService {
    query: Arc<dyn MovieQueryPort>,
    inner: Arc<Mutex<ListInner>>,
}

impl MovieListService {
    pub fn new(query: Arc<dyn MovieQueryPort>) -> Self {
        Self::with_params(query, QueryParams::default())
    }

    pub fn with_params(query: Arc<dyn MovieQueryPort>, params: QueryParams) -> Self {
        Self {
            query,
            inner: Arc::new(Mutex::new(ListInner {
                params,
                view: ViewState::default(),
                next_seq: 0,
                latest_issued: 0,
            })),
        }
    }

    /// Snapshot of the current view state
    pub async fn view(&self) -> ViewState {
        self.inner.lock().await.view.clone()
    }

    /// Snapshot of the current query parameters
    pub async fn params(&self) -> QueryParams {
        self.inner.lock().await.params.clone()
    }

    /// Merge a partial parameter update and refetch if anything changed
    ///
    /// Returns whether a fetch was issued; a no-op merge triggers nothing.
    pub async fn set_params(&self, update: QueryParamsUpdate) -> bool {
        let attempt = {
            let mut inner = self.inner.lock().await;
            let merged = inner.params.merged(&update);
            if merged == inner.params {
                tracing::debug!("params unchanged, skipping refetch");
                return false;
            }
            inner.params = merged;
            Self::begin_attempt(&mut inner)
        };
        self.complete(attempt).await;
        true
    }

    /// Refetch unconditionally with the current parameters
    pub async fn refresh(&self) {
        let attempt = {
            let mut inner = self.inner.lock().await;
            Self::begin_attempt(&mut inner)
        };
        self.complete(attempt).await;
    }

    /// Entry point for the channel's `update` notification
    ///
    /// Parameters (including the current page) are left as they are.
    pub async fn on_update_event(&self) {
        tracing::debug!("update notification received, refreshing list");
        self.refresh().await;
    }

    fn begin_attempt(inner: &mut ListInner) -> FetchAttempt {
        inner.next_seq += 1;
        inner.latest_issued = inner.next_seq;
        inner.view.loading = true;
        FetchAttempt {
            seq: inner.next_seq,
            params: inner.params.clone(),
        }
    }

    /// Await the query and apply its result through the sequence gate
    async fn complete(&self, attempt: FetchAttempt) {
        let result = self.query.fetch_page(attempt.params).await;

        let mut inner = self.inner.lock().await;
        if attempt.seq != inner.latest_issued {
            tracing::debug!(
                seq = attempt.seq,
                latest = inner.latest_issued,
                "discarding result of superseded fetch"
            );
            return;
        }

        inner.view.loading = false;
        match result {
            Ok(page) => {
                inner.view.movies = page.movies;
                inner.view.total_count = page.total_count;
                inner.view.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog fetch failed, keeping last-known-good view");
                inner.view.error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::Utc;
    use mockall::predicate;
    use tokio::sync::oneshot;

    use crate::ports::outbound::MockMovieQueryPort;
    use kinoview_protocol::{MoviePage, SortDirection};

    fn page_of(names: &[&str], total_count: u64) -> MoviePage {
        MoviePage {
            movies: names
                .iter()
                .enumerate()
                .map(|(i, name)| Movie {
                    id: i as i64 + 1,
                    name: name.to_string(),
                    genre: None,
                    oscars_count: 0,
                    creation_date: Utc::now(),
                    budget: None,
                    director: None,
                    length: None,
                })
                .collect(),
            total_count,
        }
    }

    fn names(view: &ViewState) -> Vec<String> {
        view.movies.iter().map(|m| m.name.clone()).collect()
    }

    /// Query fake whose completions are released by the test, in any order
    struct GatedQuery {
        gates: std::sync::Mutex<VecDeque<oneshot::Receiver<Result<MoviePage, QueryError>>>>,
        calls: AtomicU32,
    }

    impl GatedQuery {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                gates: std::sync::Mutex::new(VecDeque::new()),
                calls: AtomicU32::new(0),
            })
        }

        fn gate(&self) -> oneshot::Sender<Result<MoviePage, QueryError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        async fn wait_for_calls(&self, n: u32) {
            while self.calls() < n {
                tokio::task::yield_now().await;
            }
        }
    }

    #[async_trait::async_trait]
    impl MovieQueryPort for GatedQuery {
        async fn fetch_page(&self, _params: QueryParams) -> Result<MoviePage, QueryError> {
            let gate = self
                .gates
                .lock()
                .unwrap()
                .pop_front()
                .expect("no gate prepared for this fetch");
            self.calls.fetch_add(1, Ordering::SeqCst);
            gate.await.expect("gate sender dropped")
        }
    }

    #[tokio::test]
    async fn equal_params_trigger_no_fetch() {
        let mut mock = MockMovieQueryPort::new();
        mock.expect_fetch_page()
            .times(1)
            .returning(|_| Ok(page_of(&["Solaris"], 1)));

        let svc = MovieListService::new(Arc::new(mock));

        assert!(svc.set_params(QueryParamsUpdate::page(2)).await);
        // Same merged value: no second fetch (mockall enforces times(1))
        assert!(!svc.set_params(QueryParamsUpdate::page(2)).await);
        assert!(!svc.set_params(QueryParamsUpdate::default()).await);

        assert_eq!(svc.params().await.page, 2);
        assert_eq!(names(&svc.view().await), vec!["Solaris"]);
    }

    #[tokio::test]
    async fn update_event_refetches_with_unchanged_params() {
        let mut mock = MockMovieQueryPort::new();
        mock.expect_fetch_page()
            .with(predicate::eq(QueryParams::default()))
            .times(2)
            .returning(|_| Ok(page_of(&["Mirror"], 1)));

        let svc = MovieListService::new(Arc::new(mock));
        svc.refresh().await;
        svc.on_update_event().await;

        let view = svc.view().await;
        assert_eq!(view.total_count, 1);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_last_known_good_data() {
        let mut mock = MockMovieQueryPort::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_fetch_page()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(&["Stalker", "Solaris"], 2)));
        mock.expect_fetch_page()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(QueryError::Status(503)));
        mock.expect_fetch_page()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(&["Mirror"], 1)));

        let svc = MovieListService::new(Arc::new(mock));

        svc.refresh().await;
        assert_eq!(names(&svc.view().await), vec!["Stalker", "Solaris"]);

        svc.on_update_event().await;
        let view = svc.view().await;
        assert_eq!(view.error, Some(QueryError::Status(503)));
        // Stale-but-valid: previous items and total survive the failure
        assert_eq!(names(&view), vec!["Stalker", "Solaris"]);
        assert_eq!(view.total_count, 2);
        assert!(!view.loading);

        svc.refresh().await;
        let view = svc.view().await;
        assert_eq!(view.error, None);
        assert_eq!(names(&view), vec!["Mirror"]);
    }

    #[tokio::test]
    async fn late_stale_result_is_a_no_op() {
        let query = GatedQuery::new();
        let gate_a = query.gate();
        let gate_b = query.gate();

        let svc = MovieListService::new(query.clone() as Arc<dyn MovieQueryPort>);

        let svc_a = svc.clone();
        let attempt_a = tokio::spawn(async move { svc_a.refresh().await });
        query.wait_for_calls(1).await;

        let svc_b = svc.clone();
        let attempt_b = tokio::spawn(async move { svc_b.on_update_event().await });
        query.wait_for_calls(2).await;

        // B (seq 2) completes before A (seq 1)
        gate_b.send(Ok(page_of(&["fresh"], 10))).unwrap();
        attempt_b.await.unwrap();
        assert_eq!(names(&svc.view().await), vec!["fresh"]);

        gate_a.send(Ok(page_of(&["stale"], 99))).unwrap();
        attempt_a.await.unwrap();

        // A's late result must not mutate anything
        let view = svc.view().await;
        assert_eq!(names(&view), vec!["fresh"]);
        assert_eq!(view.total_count, 10);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn update_signal_during_outstanding_fetch_issues_exactly_one_more() {
        let query = GatedQuery::new();
        let gate_first = query.gate();
        let gate_second = query.gate();

        let params = QueryParams {
            page: 0,
            page_size: 10,
            filters: Default::default(),
            sort_field: "id".to_string(),
            sort_direction: SortDirection::Asc,
        };
        let svc = MovieListService::with_params(query.clone() as Arc<dyn MovieQueryPort>, params);

        let svc_first = svc.clone();
        let first = tokio::spawn(async move { svc_first.refresh().await });
        query.wait_for_calls(1).await;
        assert!(svc.view().await.loading);

        let svc_push = svc.clone();
        let pushed = tokio::spawn(async move { svc_push.on_update_event().await });
        query.wait_for_calls(2).await;
        assert_eq!(query.calls(), 2);

        // First completes first, then the push-triggered attempt
        gate_first.send(Ok(page_of(&["old page"], 5))).unwrap();
        first.await.unwrap();
        gate_second.send(Ok(page_of(&["new page"], 6))).unwrap();
        pushed.await.unwrap();

        let view = svc.view().await;
        assert_eq!(names(&view), vec!["new page"]);
        assert_eq!(view.total_count, 6);
        assert!(!view.loading);
    }
}

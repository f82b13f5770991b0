//! Search controller.
//!
//! Binds a [`SearchBackend`] to a [`SearchSession`], issuing a ticket per
//! request and settling the session when the response arrives. Debouncing
//! and scheduling live with the caller; the controller only guarantees the
//! session never moves backwards.

use tracing::debug;

use shilpkaar_search::ProductQueryParams;

use crate::backend::SearchBackend;
use crate::session::{Phase, RequestTicket, SearchSession};

/// Drives one search surface against a backend.
pub struct SearchController<B> {
    backend: B,
    session: SearchSession,
}

impl<B: SearchBackend> SearchController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: SearchSession::new(),
        }
    }

    /// Merge a partial filter change into the session, issue a search for
    /// the merged filters and settle the session with its outcome.
    ///
    /// Returns the phase the session ended up in. A response that lost a
    /// race to a newer request leaves the session untouched.
    pub async fn run(&mut self, patch: ProductQueryParams) -> Phase {
        let ticket = self.session.update_filters(patch);
        self.settle(ticket).await
    }

    /// Re-run the current filters unchanged, e.g. after a retryable failure.
    pub async fn retry(&mut self) -> Phase {
        let ticket = self.session.begin();
        self.settle(ticket).await
    }

    async fn settle(&mut self, ticket: RequestTicket) -> Phase {
        let params = self.session.filters().clone();
        match self.backend.search_products(&params).await {
            Ok(response) => {
                if !self.session.apply_success(&ticket, response) {
                    debug!(seq = ticket.seq(), "discarding stale search response");
                }
            }
            Err(e) => {
                if !self.session.apply_failure(&ticket, &e) {
                    debug!(seq = ticket.seq(), "discarding stale search failure");
                }
            }
        }
        self.session.phase()
    }

    #[must_use]
    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use shilpkaar_search::{
        ArtisanQueryParams, ArtisanSearchResponse, Pagination, ProductSearchResponse, Suggestion,
    };

    use super::*;
    use crate::backend::ClientError;

    /// Backend that replays a script of outcomes in order, recording the
    /// parameters of each call.
    struct ScriptedBackend {
        script: Mutex<Vec<Result<ProductSearchResponse, ClientError>>>,
        seen: Mutex<Vec<ProductQueryParams>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<ProductSearchResponse, ClientError>>) -> Self {
            Self {
                script: Mutex::new(script),
                seen: Mutex::new(vec![]),
            }
        }

        fn last_params(&self) -> ProductQueryParams {
            self.seen
                .lock()
                .expect("seen lock")
                .last()
                .cloned()
                .expect("at least one call")
        }
    }

    impl SearchBackend for ScriptedBackend {
        async fn search_products(
            &self,
            params: &ProductQueryParams,
        ) -> Result<ProductSearchResponse, ClientError> {
            self.seen.lock().expect("seen lock").push(params.clone());
            self.script.lock().expect("script lock").remove(0)
        }

        async fn search_artisans(
            &self,
            _params: &ArtisanQueryParams,
        ) -> Result<ArtisanSearchResponse, ClientError> {
            unreachable!("not scripted")
        }

        async fn suggest(&self, _input: &str) -> Result<Vec<Suggestion>, ClientError> {
            unreachable!("not scripted")
        }
    }

    fn response(total: usize) -> ProductSearchResponse {
        ProductSearchResponse {
            products: vec![],
            pagination: Pagination {
                current: 1,
                pages: total.div_ceil(20),
                total,
                limit: 20,
            },
            filters: None,
        }
    }

    fn total(controller: &SearchController<ScriptedBackend>) -> Option<usize> {
        controller.session().results().map(|r| r.pagination.total)
    }

    #[tokio::test]
    async fn test_success_then_failure_keeps_results() {
        let backend = ScriptedBackend::new(vec![
            Ok(response(4)),
            Err(ClientError::Unavailable),
            Ok(response(9)),
        ]);
        let mut controller = SearchController::new(backend);

        assert_eq!(
            controller.run(ProductQueryParams::default()).await,
            Phase::Success
        );
        assert_eq!(total(&controller), Some(4));

        assert_eq!(
            controller.run(ProductQueryParams::default()).await,
            Phase::Failure
        );
        // The previous page is still renderable next to the error.
        assert_eq!(total(&controller), Some(4));
        assert!(controller.session().last_error().is_some());

        assert_eq!(controller.retry().await, Phase::Success);
        assert_eq!(total(&controller), Some(9));
    }

    #[tokio::test]
    async fn test_invalid_query_surfaces_parameter_message() {
        let backend = ScriptedBackend::new(vec![Err(ClientError::InvalidQuery(
            "invalid value for parameter 'minPrice': 'abc' is not a number".to_string(),
        ))]);
        let mut controller = SearchController::new(backend);

        assert_eq!(
            controller.run(ProductQueryParams::default()).await,
            Phase::Failure
        );
        let error = controller.session().last_error().expect("error recorded");
        assert!(error.contains("minPrice"));
    }

    #[tokio::test]
    async fn test_retry_resends_current_filters_unchanged() {
        let backend = ScriptedBackend::new(vec![
            Ok(response(8)),
            Err(ClientError::Unavailable),
            Ok(response(8)),
        ]);
        let mut controller = SearchController::new(backend);

        controller
            .run(ProductQueryParams {
                q: Some("pashmina".to_string()),
                page: Some("2".to_string()),
                ..ProductQueryParams::default()
            })
            .await;

        assert_eq!(controller.retry().await, Phase::Failure);
        assert_eq!(controller.retry().await, Phase::Success);

        // A retry is not a filter change: same query, same page.
        let params = controller.backend().last_params();
        assert_eq!(params.q.as_deref(), Some("pashmina"));
        assert_eq!(params.page.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_patches_accumulate_and_facet_change_resets_page() {
        let backend = ScriptedBackend::new(vec![Ok(response(40)), Ok(response(40)), Ok(response(12))]);
        let mut controller = SearchController::new(backend);

        controller
            .run(ProductQueryParams {
                q: Some("sari".to_string()),
                ..ProductQueryParams::default()
            })
            .await;
        controller
            .run(ProductQueryParams {
                page: Some("2".to_string()),
                ..ProductQueryParams::default()
            })
            .await;
        let params = controller.backend().last_params();
        assert_eq!(params.q.as_deref(), Some("sari"));
        assert_eq!(params.page.as_deref(), Some("2"));

        controller
            .run(ProductQueryParams {
                category: Some("Textiles".to_string()),
                ..ProductQueryParams::default()
            })
            .await;
        let params = controller.backend().last_params();
        assert_eq!(params.q.as_deref(), Some("sari"));
        assert_eq!(params.category.as_deref(), Some("Textiles"));
        assert_eq!(params.page.as_deref(), Some("1"));
    }
}

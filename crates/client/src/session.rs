//! Search session state machine.
//!
//! A session tracks one logical search surface (a results page): the active
//! filters, the current results and the facet options the UI may offer.
//! Filter changes arrive as partial patches and are merged into the active
//! filters; changing a facet resets pagination to the first page.
//!
//! Each new request gets a monotonically increasing sequence number; only
//! the response for the most recently issued request may change the session,
//! so a slow earlier response can never overwrite a newer one. A failure
//! keeps the last good results so the surface can keep rendering them
//! alongside the error.

use shilpkaar_search::{FilterOptions, ProductQueryParams, ProductSearchResponse};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No request issued yet.
    #[default]
    Idle,
    /// The latest request is in flight.
    Loading,
    /// The latest request completed and its results are current.
    Success,
    /// The latest request failed; `results` still holds the last good page.
    Failure,
}

/// Proof that a request was issued, carrying its sequence number.
///
/// Tickets are deliberately not `Clone`: one request, one ticket, one
/// settlement.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
}

impl RequestTicket {
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// State for one search surface.
#[derive(Debug, Default)]
pub struct SearchSession {
    issued: u64,
    phase: Phase,
    filters: ProductQueryParams,
    results: Option<ProductSearchResponse>,
    options: Option<FilterOptions>,
    error: Option<String>,
}

impl SearchSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial filter change into the active filters and issue a new
    /// request for the merged state.
    ///
    /// `Some` fields in the patch override the active value; `None` fields
    /// are left alone, and an empty string clears a filter (the server
    /// treats blank parameters as absent). Changing any facet resets the
    /// page to 1 unless the patch sets a page itself.
    pub fn update_filters(&mut self, patch: ProductQueryParams) -> RequestTicket {
        let explicit_page = patch.page.is_some();
        let facet_changed = merge_filters(&mut self.filters, patch);
        if facet_changed && !explicit_page {
            self.filters.page = Some("1".to_string());
        }
        self.begin()
    }

    /// Issue a new request for the current filters. Any still-unsettled
    /// earlier request becomes stale and its eventual response will be
    /// discarded.
    pub fn begin(&mut self) -> RequestTicket {
        self.issued += 1;
        self.phase = Phase::Loading;
        RequestTicket { seq: self.issued }
    }

    /// Settle a successful response. Returns `false` (and changes nothing)
    /// when the ticket is stale.
    ///
    /// A response with `filters: null` keeps the previous facet options on
    /// display; the server degraded the aggregation, not the results.
    pub fn apply_success(&mut self, ticket: &RequestTicket, response: ProductSearchResponse) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = Phase::Success;
        if let Some(options) = &response.filters {
            self.options = Some(options.clone());
        }
        self.results = Some(response);
        self.error = None;
        true
    }

    /// Settle a failed response. Returns `false` when the ticket is stale.
    /// The last good results are preserved.
    pub fn apply_failure(&mut self, ticket: &RequestTicket, error: impl ToString) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = Phase::Failure;
        self.error = Some(error.to_string());
        true
    }

    fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.seq == self.issued
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The filters the next request will be issued for.
    #[must_use]
    pub const fn filters(&self) -> &ProductQueryParams {
        &self.filters
    }

    /// The most recent successful response, surviving later failures.
    #[must_use]
    pub const fn results(&self) -> Option<&ProductSearchResponse> {
        self.results.as_ref()
    }

    /// The most recent facet options, surviving degraded responses.
    #[must_use]
    pub const fn filter_options(&self) -> Option<&FilterOptions> {
        self.options.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sequence number of the most recently issued request.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.issued
    }
}

/// Merge `Some` patch fields into `base`. Returns whether any facet (i.e.
/// non-pagination, non-sort) field changed value.
fn merge_filters(base: &mut ProductQueryParams, patch: ProductQueryParams) -> bool {
    let mut facet_changed = false;

    macro_rules! merge_facet {
        ($($field:ident),* $(,)?) => {$(
            if let Some(value) = patch.$field {
                if base.$field.as_deref() != Some(value.as_str()) {
                    facet_changed = true;
                }
                base.$field = Some(value);
            }
        )*};
    }
    macro_rules! merge_plain {
        ($($field:ident),* $(,)?) => {$(
            if let Some(value) = patch.$field {
                base.$field = Some(value);
            }
        )*};
    }

    merge_facet!(
        q,
        category,
        craft,
        location,
        region,
        min_price,
        max_price,
        min_rating,
        materials,
        colors,
        techniques,
        occasions,
        age_group,
        gender,
        season,
        sustainability,
        featured,
        trending,
    );
    merge_plain!(sort_by, sort_order, page, limit);

    facet_changed
}

#[cfg(test)]
mod tests {
    use shilpkaar_search::{Pagination, ProductPage};

    use super::*;

    fn response(total: usize) -> ProductSearchResponse {
        let page = ProductPage {
            hits: vec![],
            total,
            page: 1,
            limit: 20,
            total_pages: total.div_ceil(20),
        };
        ProductSearchResponse {
            pagination: page.pagination(),
            products: page.hits,
            filters: None,
        }
    }

    fn response_with_options(total: usize, categories: &[&str]) -> ProductSearchResponse {
        let mut response = response(total);
        response.filters = Some(FilterOptions {
            categories: Some(categories.iter().map(ToString::to_string).collect()),
            ..FilterOptions::default()
        });
        response
    }

    fn total(session: &SearchSession) -> Option<usize> {
        session.results().map(|r| r.pagination.total)
    }

    #[test]
    fn test_lifecycle_idle_loading_success() {
        let mut session = SearchSession::new();
        assert_eq!(session.phase(), Phase::Idle);

        let ticket = session.begin();
        assert_eq!(session.phase(), Phase::Loading);

        assert!(session.apply_success(&ticket, response(3)));
        assert_eq!(session.phase(), Phase::Success);
        assert_eq!(total(&session), Some(3));
        assert_eq!(
            session.results().map(|r| r.pagination),
            Some(Pagination {
                current: 1,
                pages: 1,
                total: 3,
                limit: 20
            })
        );
    }

    #[test]
    fn test_stale_success_is_discarded() {
        let mut session = SearchSession::new();
        let old = session.begin();
        let new = session.begin();

        // The newer request settles first.
        assert!(session.apply_success(&new, response(2)));
        // The slow earlier response must not overwrite it.
        assert!(!session.apply_success(&old, response(99)));
        assert_eq!(total(&session), Some(2));
        assert_eq!(session.phase(), Phase::Success);
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut session = SearchSession::new();
        let old = session.begin();
        let new = session.begin();

        assert!(session.apply_success(&new, response(1)));
        assert!(!session.apply_failure(&old, "timeout"));
        assert_eq!(session.phase(), Phase::Success);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_failure_preserves_last_good_results() {
        let mut session = SearchSession::new();
        let first = session.begin();
        assert!(session.apply_success(&first, response(5)));

        let second = session.begin();
        assert!(session.apply_failure(&second, "search index is not available yet"));
        assert_eq!(session.phase(), Phase::Failure);
        assert_eq!(total(&session), Some(5));
        assert_eq!(
            session.last_error(),
            Some("search index is not available yet")
        );

        // A later success clears the error again.
        let third = session.begin();
        assert!(session.apply_success(&third, response(7)));
        assert!(session.last_error().is_none());
        assert_eq!(total(&session), Some(7));
    }

    #[test]
    fn test_sequence_numbers_are_monotonic() {
        let mut session = SearchSession::new();
        let a = session.begin();
        let b = session.begin();
        let c = session.begin();
        assert!(a.seq() < b.seq() && b.seq() < c.seq());
        assert_eq!(session.issued(), c.seq());
    }

    #[test]
    fn test_update_filters_merges_patch() {
        let mut session = SearchSession::new();
        session.update_filters(ProductQueryParams {
            q: Some("pottery".to_string()),
            category: Some("Home Decor".to_string()),
            ..ProductQueryParams::default()
        });
        session.update_filters(ProductQueryParams {
            min_price: Some("500".to_string()),
            ..ProductQueryParams::default()
        });

        let filters = session.filters();
        assert_eq!(filters.q.as_deref(), Some("pottery"));
        assert_eq!(filters.category.as_deref(), Some("Home Decor"));
        assert_eq!(filters.min_price.as_deref(), Some("500"));
    }

    #[test]
    fn test_facet_change_resets_page() {
        let mut session = SearchSession::new();
        session.update_filters(ProductQueryParams {
            page: Some("4".to_string()),
            ..ProductQueryParams::default()
        });
        assert_eq!(session.filters().page.as_deref(), Some("4"));

        session.update_filters(ProductQueryParams {
            category: Some("Jewelry".to_string()),
            ..ProductQueryParams::default()
        });
        assert_eq!(session.filters().page.as_deref(), Some("1"));
    }

    #[test]
    fn test_sort_change_keeps_page() {
        let mut session = SearchSession::new();
        session.update_filters(ProductQueryParams {
            page: Some("3".to_string()),
            ..ProductQueryParams::default()
        });
        session.update_filters(ProductQueryParams {
            sort_by: Some("price".to_string()),
            sort_order: Some("asc".to_string()),
            ..ProductQueryParams::default()
        });
        assert_eq!(session.filters().page.as_deref(), Some("3"));
        assert_eq!(session.filters().sort_by.as_deref(), Some("price"));
    }

    #[test]
    fn test_repeated_facet_value_is_not_a_change() {
        let mut session = SearchSession::new();
        session.update_filters(ProductQueryParams {
            category: Some("Textiles".to_string()),
            ..ProductQueryParams::default()
        });
        session.update_filters(ProductQueryParams {
            page: Some("2".to_string()),
            ..ProductQueryParams::default()
        });
        // Re-sending the same category must not bounce back to page 1.
        session.update_filters(ProductQueryParams {
            category: Some("Textiles".to_string()),
            ..ProductQueryParams::default()
        });
        assert_eq!(session.filters().page.as_deref(), Some("2"));
    }

    #[test]
    fn test_degraded_response_keeps_last_options() {
        let mut session = SearchSession::new();
        let first = session.begin();
        assert!(session.apply_success(&first, response_with_options(10, &["Pottery"])));
        assert_eq!(
            session.filter_options().and_then(|o| o.categories.clone()),
            Some(vec!["Pottery".to_string()])
        );

        // Aggregation degraded on the server; results land, options stay.
        let second = session.begin();
        assert!(session.apply_success(&second, response(6)));
        assert_eq!(total(&session), Some(6));
        assert_eq!(
            session.filter_options().and_then(|o| o.categories.clone()),
            Some(vec!["Pottery".to_string()])
        );
    }
}

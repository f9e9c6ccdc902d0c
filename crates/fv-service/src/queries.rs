use std::sync::Arc;

use fv_store::{FeatureQuery, FeatureStore};
use fv_types::{Feature, FeatureOrder, FieldErrors};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

pub const PARAM_PAGE: &str = "page";
pub const PARAM_LIMIT: &str = "limit";

pub const MSG_POSITIVE_INTEGER: &str = "A valid positive integer is required.";
pub const MSG_NON_NEGATIVE_INTEGER: &str = "A valid non-negative integer is required.";

/// Paging and truncation defaults for collection queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLimits {
    /// Features per list page. Fixed by the server, not the caller.
    pub page_size: usize,
    /// Length of top-voted and recent lists when no limit is given.
    pub default_limit: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            page_size: 20,
            default_limit: 10,
        }
    }
}

/// One page of a larger result set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Total matches across all pages.
    pub count: usize,
    /// 1-based page number.
    pub page: u64,
    pub page_size: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn num_pages(&self) -> u64 {
        if self.count == 0 {
            1
        } else {
            self.count.div_ceil(self.page_size) as u64
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Read-side views over the feature collection.
#[derive(Clone)]
pub struct FeatureQueries {
    store: Arc<dyn FeatureStore>,
    limits: QueryLimits,
}

impl FeatureQueries {
    pub fn new(store: Arc<dyn FeatureStore>, limits: QueryLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Search and paginate in default order.
    ///
    /// The search term is matched as given; only an empty term matches
    /// everything. Page 1 of an empty result is valid; any page past the
    /// last is [`ServiceError::InvalidPage`].
    pub fn list(&self, search: Option<&str>, page: Option<u64>) -> ServiceResult<Page<Feature>> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(invalid(PARAM_PAGE, MSG_POSITIVE_INTEGER));
        }
        let page_size = self.limits.page_size.max(1);

        let offset = usize::try_from(page - 1)
            .ok()
            .and_then(|p| p.checked_mul(page_size))
            .ok_or(ServiceError::InvalidPage(page))?;

        let mut query = FeatureQuery::all().offset(offset).limit(page_size);
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            query = query.search(term);
        }
        let result = self.store.query(&query)?;

        let page = Page {
            count: result.total,
            page,
            page_size,
            results: result.features,
        };
        if page.page > page.num_pages() {
            return Err(ServiceError::InvalidPage(page.page));
        }
        Ok(page)
    }

    /// Features by votes descending, truncated to `limit`.
    pub fn top_voted(&self, limit: Option<usize>) -> ServiceResult<Vec<Feature>> {
        self.ordered(FeatureOrder::TopVoted, limit)
    }

    /// Features by creation time descending, truncated to `limit`.
    pub fn recent(&self, limit: Option<usize>) -> ServiceResult<Vec<Feature>> {
        self.ordered(FeatureOrder::Recent, limit)
    }

    fn ordered(&self, order: FeatureOrder, limit: Option<usize>) -> ServiceResult<Vec<Feature>> {
        let limit = limit.unwrap_or(self.limits.default_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query = FeatureQuery::all().order(order).limit(limit);
        Ok(self.store.query(&query)?.features)
    }
}

impl std::fmt::Debug for FeatureQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureQueries")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

fn invalid(param: &str, message: &str) -> ServiceError {
    ServiceError::InvalidParameter(FieldErrors::single(param, message))
}

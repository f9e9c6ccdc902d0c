//! Query-string and path parsing.
//!
//! Parameters arrive as raw strings so a bad value becomes a field error
//! naming the parameter, rather than a generic extractor rejection.

use fv_service::queries::{MSG_NON_NEGATIVE_INTEGER, MSG_POSITIVE_INTEGER, PARAM_LIMIT, PARAM_PAGE};
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use fv_types::{FeatureId, FieldErrors};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<String>,
}

/// Parsed paging request for the list endpoint.
#[derive(Debug, PartialEq, Eq)]
pub struct ListRequest {
    pub search: Option<String>,
    pub page: Option<u64>,
}

impl ListParams {
    pub fn parse(self) -> Result<ListRequest, ApiError> {
        let mut errors = FieldErrors::new();
        let page = positive(PARAM_PAGE, self.page.as_deref(), &mut errors);
        errors
            .into_result(ListRequest {
                search: self.search,
                page,
            })
            .map_err(ApiError::Fields)
    }
}

impl LimitParams {
    pub fn parse(self) -> Result<Option<usize>, ApiError> {
        let Some(raw) = self.limit else {
            return Ok(None);
        };
        // Oversized limits saturate; the list is bounded by the collection.
        match raw.trim().parse::<u64>() {
            Ok(limit) => Ok(Some(usize::try_from(limit).unwrap_or(usize::MAX))),
            Err(_) => Err(ApiError::Fields(FieldErrors::single(PARAM_LIMIT, MSG_NON_NEGATIVE_INTEGER))),
        }
    }
}

fn positive(name: &str, raw: Option<&str>, errors: &mut FieldErrors) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            errors.add(name, MSG_POSITIVE_INTEGER);
            None
        }
        Ok(n) => Some(n),
    }
}

/// Unwrap a query extraction, reporting a rejected query string the same
/// way as any other malformed request.
pub fn query<T>(extracted: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    extracted.map(|Query(params)| params).map_err(|rejection| {
        tracing::debug!(%rejection, "rejected query string");
        ApiError::Malformed(rejection.body_text())
    })
}

/// Ids that do not parse name no feature, so they are a 404.
pub fn feature_id(raw: &str) -> Result<FeatureId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(page: Option<&str>) -> Result<ListRequest, ApiError> {
        ListParams {
            search: None,
            page: page.map(String::from),
        }
        .parse()
    }

    #[test]
    fn absent_page_is_none() {
        assert_eq!(list(None).unwrap().page, None);
    }

    #[test]
    fn numeric_page_parses() {
        assert_eq!(list(Some("3")).unwrap().page, Some(3));
    }

    #[test]
    fn bad_page_is_a_field_error() {
        for raw in ["zero", "0", "-2"] {
            let Err(ApiError::Fields(errors)) = list(Some(raw)) else {
                panic!("expected field errors for {raw}");
            };
            assert_eq!(errors.get(PARAM_PAGE).unwrap(), [MSG_POSITIVE_INTEGER]);
        }
    }

    #[test]
    fn search_is_kept_verbatim() {
        let req = ListParams {
            search: Some(" dark ".into()),
            page: None,
        }
        .parse()
        .unwrap();
        assert_eq!(req.search.as_deref(), Some(" dark "));
    }

    #[test]
    fn rejected_query_is_malformed() {
        let uri: axum::http::Uri = "/v1/features/?page=1&page=2".parse().unwrap();
        let extracted = Query::<ListParams>::try_from_uri(&uri);
        assert!(extracted.is_err());
        assert!(matches!(query(extracted), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn limit_parsing() {
        let parse = |raw: Option<&str>| LimitParams { limit: raw.map(String::from) }.parse();
        assert_eq!(parse(None).unwrap(), None);
        assert_eq!(parse(Some("0")).unwrap(), Some(0));
        assert_eq!(parse(Some("7")).unwrap(), Some(7));
        assert!(matches!(parse(Some("-1")), Err(ApiError::Fields(_))));
        assert!(matches!(parse(Some("ten")), Err(ApiError::Fields(_))));
    }

    #[test]
    fn path_ids() {
        assert_eq!(feature_id("42").unwrap(), FeatureId::new(42));
        assert!(matches!(feature_id("abc"), Err(ApiError::NotFound)));
        assert!(matches!(feature_id("0"), Err(ApiError::NotFound)));
    }
}

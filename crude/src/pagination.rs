//! Paginated list reads
//!
//! Page parameters come from the `page` and `show` query-string keys. A page
//! is fetched with [`DataAccess::read_limit`] while the total is computed with
//! [`DataAccess::count`]; both run concurrently and both must succeed.
//!
//! # Example
//!
//! ```rust
//! use crude::pagination::{link_header, PageParams, PaginationMeta};
//! use crude::request::RequestUrl;
//!
//! let params = PageParams::parse(Some("2"), Some("10"), 6);
//! assert_eq!(params.skip, 10);
//!
//! let meta = PaginationMeta::new(params.page, params.limit, 35);
//! let url = RequestUrl {
//!     scheme: "http".into(),
//!     host: "localhost".into(),
//!     port: Some(3000),
//!     path: "/posts".into(),
//! };
//! assert_eq!(
//!     link_header(&url, &meta).as_deref(),
//!     Some(
//!         "<http://localhost:3000/posts?page=3&show=10>; rel=\"next\", \
//!          <http://localhost:3000/posts?page=4&show=10>; rel=\"last\""
//!     )
//! );
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::handlers::{CrudError, CrudOperation};
use crate::query::Query;
use crate::repository::{DataAccess, DataAccessOperation};
use crate::request::RequestUrl;
use crate::schema::Record;

/// Page position requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-indexed page number
    pub page: u64,
    /// Page size
    pub limit: u64,
    /// Records before the page
    pub skip: u64,
}

impl PageParams {
    /// Parse raw `page` / `show` values
    ///
    /// Values are read from their leading integer, so `"2abc"` is 2 and
    /// `"1.5"` is 1. Missing, non-numeric, zero or negative values fall back
    /// to page 1 and `default_limit`.
    #[must_use]
    pub fn parse(page: Option<&str>, show: Option<&str>, default_limit: u64) -> Self {
        let positive = |raw: Option<&str>| {
            raw.and_then(leading_integer)
                .and_then(|v| u64::try_from(v).ok())
                .filter(|v| *v > 0)
        };
        let page = positive(page).unwrap_or(1);
        let limit = positive(show).unwrap_or(default_limit).max(1);

        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
        }
    }

    /// Parse from query-string parameters
    #[must_use]
    pub fn from_query(params: &BTreeMap<String, String>, default_limit: u64) -> Self {
        Self::parse(
            params.get("page").map(String::as_str),
            params.get("show").map(String::as_str),
            default_limit,
        )
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value = rest[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u64,
    /// Number of items per page
    pub per_page: u64,
    /// Total number of items across all pages
    pub total: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Derive page counts from the current position and total
    #[must_use]
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page);

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One page of records
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records on this page
    pub items: Vec<Record>,
    /// Position and totals
    pub meta: PaginationMeta,
    /// `Link` header value, if any
    pub link: Option<String>,
}

/// Fetch a page of records and the total count concurrently
///
/// # Errors
///
/// If either call fails the whole page fails; the error is reported for the
/// `paginate` operation.
pub async fn paginate<D: DataAccess>(
    data_access: &D,
    query: &Query,
    params: PageParams,
    url: &RequestUrl,
) -> Result<Page, CrudError> {
    let (items, total) = futures::future::try_join(
        async {
            data_access
                .read_limit(query, params.skip, params.limit)
                .await
                .map_err(|e| e.with_operation(DataAccessOperation::ReadLimit))
        },
        async {
            data_access
                .count(query)
                .await
                .map_err(|e| e.with_operation(DataAccessOperation::Count))
        },
    )
    .await
    .map_err(|e| {
        tracing::warn!(error = %e, page = params.page, "Pagination failed");
        CrudError::from_data_access(CrudOperation::Paginate, e).context("Pagination failed")
    })?;

    let meta = PaginationMeta::new(params.page, params.limit, total);
    tracing::debug!(
        page = meta.page,
        per_page = meta.per_page,
        total = meta.total,
        "Fetched page"
    );

    Ok(Page {
        items,
        link: link_header(url, &meta),
        meta,
    })
}

/// Build a `Link` header with `next` and `last` relations
///
/// Returns `None` when there is nothing to link to.
#[must_use]
pub fn link_header(url: &RequestUrl, meta: &PaginationMeta) -> Option<String> {
    let href = |page: u64| {
        format!(
            "<{}{}?page={page}&show={}>",
            url.origin(),
            url.path,
            meta.per_page
        )
    };

    let mut links = Vec::with_capacity(2);
    if meta.has_next {
        links.push(format!("{}; rel=\"next\"", href(meta.page + 1)));
    }
    if meta.total_pages >= 1 {
        links.push(format!("{}; rel=\"last\"", href(meta.total_pages)));
    }

    (!links.is_empty()).then(|| links.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::CrudErrorKind;
    use crate::repository::testing::{Call, StubStore};
    use crate::repository::{DataAccessError, DataAccessErrorKind, MemoryStore};
    use crate::schema::SchemaMap;
    use serde_json::json;

    fn store(n: u64) -> StubStore {
        StubStore::new(MemoryStore::new(SchemaMap::new()).with_records((1..=n).map(|i| {
            let mut r = Record::new();
            r.insert("id".into(), json!(i.to_string()));
            r
        })))
    }

    #[test]
    fn test_page_params_math() {
        assert_eq!(
            PageParams::parse(Some("3"), Some("5"), 6),
            PageParams {
                page: 3,
                limit: 5,
                skip: 10
            }
        );
        for bad in [None, Some("0"), Some("-2"), Some("abc"), Some("")] {
            let params = PageParams::parse(bad, bad, 6);
            assert_eq!(params.page, 1);
            assert_eq!(params.limit, 6);
            assert_eq!(params.skip, 0);
        }
    }

    #[test]
    fn test_page_params_read_leading_digits() {
        assert_eq!(PageParams::parse(Some("2abc"), Some("1.5"), 6).page, 2);
        assert_eq!(PageParams::parse(Some("2abc"), Some("1.5"), 6).limit, 1);
        assert_eq!(PageParams::parse(Some(" 3"), Some("+4"), 6).skip, 8);
        assert_eq!(PageParams::parse(Some("-1x"), Some("x1"), 6).page, 1);
        assert_eq!(PageParams::parse(Some("-1x"), Some("x1"), 6).limit, 6);
    }

    #[test]
    fn test_meta() {
        let meta = PaginationMeta::new(2, 6, 13);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let empty = PaginationMeta::new(1, 6, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }

    #[test]
    fn test_link_header_default_port_and_last_page() {
        let url = RequestUrl {
            scheme: "https".into(),
            host: "example.com".into(),
            port: Some(443),
            path: "/posts".into(),
        };
        let last = PaginationMeta::new(2, 6, 12);
        assert_eq!(
            link_header(&url, &last).as_deref(),
            Some("<https://example.com/posts?page=2&show=6>; rel=\"last\"")
        );
        assert_eq!(link_header(&url, &PaginationMeta::new(1, 6, 0)), None);
    }

    #[tokio::test]
    async fn test_paginate_fetches_window_and_count() {
        let store = store(13);
        let query = Query::new();
        let page = paginate(
            &store,
            &query,
            PageParams::parse(Some("3"), None, 6),
            &RequestUrl::default(),
        )
        .await
        .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.meta.total, 13);
        assert_eq!(page.meta.total_pages, 3);
        assert!(!page.meta.has_next);

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&Call::ReadLimit(Query::new(), 12, 6)));
        assert!(calls.contains(&Call::Count(Query::new())));
    }

    #[tokio::test]
    async fn test_paginate_failure_is_aggregated() {
        let store = store(3).failing(DataAccessError::connection_failed(
            DataAccessOperation::Read,
            "down",
        ));
        let err = paginate(
            &store,
            &Query::new(),
            PageParams::parse(None, None, 6),
            &RequestUrl::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.operation, CrudOperation::Paginate);
        assert_eq!(
            err.kind,
            CrudErrorKind::DataAccess(DataAccessErrorKind::ConnectionFailed)
        );
        assert!(err.message.starts_with("Pagination failed: "));
    }
}

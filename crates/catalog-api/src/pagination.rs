//! Page-number pagination
//!
//! `?page=` is 1-based; `?page_size=` defaults to 12 and is capped at 100.
//! A page that is not a positive integer, or lies past the last page, is a
//! 404. An unusable `page_size` falls back to the default.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{db_error, not_found, ApiResult, Missing};

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 100;

/// One page of a list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub count: u64,
    /// Next page number, if any
    pub next: Option<u64>,
    /// Previous page number, if any
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Requested page, validated against the query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn from_params(params: &HashMap<String, String>) -> ApiResult<Self> {
        let page = match params.get("page").map(|p| p.trim()) {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(not_found(Missing::Page)),
            },
        };

        let page_size = params
            .get("page_size")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&size| size > 0)
            .map(|size| size.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self { page, page_size })
    }

    fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.page_size).max(1)
    }

    /// Reject pages past the end; page 1 of an empty list is fine
    fn check(&self, count: u64) -> ApiResult<()> {
        if self.page > self.num_pages(count) {
            return Err(not_found(Missing::Page));
        }
        Ok(())
    }

    fn wrap<T>(&self, count: u64, results: Vec<T>) -> Page<T> {
        Page {
            count,
            next: (self.page < self.num_pages(count)).then_some(self.page + 1),
            previous: (self.page > 1).then(|| self.page - 1),
            results,
        }
    }

    /// Slice an already-loaded list
    pub fn slice<T>(&self, items: Vec<T>) -> ApiResult<Page<T>> {
        let count = items.len() as u64;
        self.check(count)?;
        let start = ((self.page - 1) * self.page_size) as usize;
        let results = items
            .into_iter()
            .skip(start)
            .take(self.page_size as usize)
            .collect();
        Ok(self.wrap(count, results))
    }
}

/// Run `query` for the requested page
pub async fn fetch_page<'db, C, E>(
    db: &'db C,
    query: Select<E>,
    request: PageRequest,
) -> ApiResult<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Sync + 'db,
{
    let paginator = query.paginate(db, request.page_size);
    let count = paginator.num_items().await.map_err(db_error)?;
    request.check(count)?;
    let results = paginator
        .fetch_page(request.page - 1)
        .await
        .map_err(db_error)?;
    Ok(request.wrap(count, results))
}

/// Apply an optional `?limit=`; unparsable values are ignored
pub fn parse_limit(params: &HashMap<String, String>) -> Option<u64> {
    params.get("limit").and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let request = PageRequest::from_params(&HashMap::new()).unwrap();
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn test_page_size_is_capped() {
        let request = PageRequest::from_params(&params(&[("page_size", "500")])).unwrap();
        assert_eq!(request.page_size, MAX_PAGE_SIZE);

        let request = PageRequest::from_params(&params(&[("page_size", "abc")])).unwrap();
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);

        let request = PageRequest::from_params(&params(&[("page_size", "0")])).unwrap();
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_page_is_not_found() {
        for bad in ["0", "-1", "two"] {
            let (status, _) = PageRequest::from_params(&params(&[("page", bad)])).unwrap_err();
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_slice_links() {
        let request = PageRequest {
            page: 2,
            page_size: 3,
        };
        let page = request.slice((1..=7).collect::<Vec<_>>()).unwrap();
        assert_eq!(page.count, 7);
        assert_eq!(page.results, vec![4, 5, 6]);
        assert_eq!(page.previous, Some(1));
        assert_eq!(page.next, Some(3));
    }

    #[test]
    fn test_empty_first_page_is_allowed() {
        let page = PageRequest::default().slice(Vec::<i32>::new()).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());

        let past_end = PageRequest {
            page: 2,
            page_size: 12,
        };
        assert!(past_end.slice(Vec::<i32>::new()).is_err());
    }
}

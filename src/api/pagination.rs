//! Page/per-page query handling for list endpoints.

use serde::Serialize;
use std::collections::HashMap;

use super::ApiError;
use crate::config::PaginationConfig;
use crate::db::Page;
use crate::models::Paged;

/// Page request resolved against the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    offset: u64,
}

impl Pagination {
    /// Reads the page variables from `params`. A page below the minimum is
    /// raised to it and per-page is clamped into its bounds. A page whose
    /// offset would not fit a SQL `BIGINT` is rejected.
    pub fn from_query(
        config: &PaginationConfig,
        params: &HashMap<String, String>,
    ) -> Result<Self, ApiError> {
        let page = parse_var(params, &config.page_var)?
            .unwrap_or(config.page_min)
            .max(config.page_min);

        let per_page = parse_var(params, &config.per_page_var)?
            .unwrap_or(config.per_page_default)
            .clamp(config.per_page_min, config.per_page_max);

        let offset = (page - config.page_min)
            .checked_mul(per_page)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| {
                ApiError::invalid_parameter(format!("{} is out of range", config.page_var))
            })?;

        Ok(Self {
            page,
            per_page,
            offset,
        })
    }

    #[must_use]
    pub const fn window(&self) -> Page {
        Page::new(self.offset, self.per_page)
    }

    #[must_use]
    pub fn respond<T>(&self, paged: Paged<T>) -> PageResponse<T> {
        PageResponse {
            page_count: paged.total.div_ceil(self.per_page),
            items: paged.items,
            page: self.page,
            per_page: self.per_page,
            total_items: paged.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub page_count: u64,
    pub total_items: u64,
}

fn parse_var(params: &HashMap<String, String>, name: &str) -> Result<Option<u64>, ApiError> {
    match params.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        // Negative numbers are below every minimum.
        Some(v)
            if v
                .strip_prefix('-')
                .is_some_and(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit())) =>
        {
            Ok(Some(0))
        }
        Some(v) => v.parse().map(Some).map_err(|_| {
            ApiError::invalid_parameter(format!("{name} must be a non-negative integer"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = PaginationConfig::default();
        let p = Pagination::from_query(&config, &HashMap::new()).unwrap();

        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 20);
        assert_eq!(p.window(), Page::new(0, 20));
    }

    #[test]
    fn test_huge_page_is_rejected() {
        let config = PaginationConfig::default();

        let err = Pagination::from_query(&config, &params(&[("page", &u64::MAX.to_string())]))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrlParameter(_)));

        // Offset just past i64::MAX.
        let max_offset = u64::try_from(i64::MAX).unwrap();
        let page = max_offset / 20 + 2;
        let err = Pagination::from_query(&config, &params(&[("page", &page.to_string())]))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_url_parameter");

        let page = max_offset / 20;
        let p = Pagination::from_query(&config, &params(&[("page", &page.to_string())])).unwrap();
        assert_eq!(p.window().offset, (page - 1) * 20);
    }

    #[test]
    fn test_bounds_are_applied() {
        let config = PaginationConfig::default();

        let p = Pagination::from_query(&config, &params(&[("page", "0"), ("per_page", "1000")]))
            .unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 100);

        let p = Pagination::from_query(&config, &params(&[("page", "-3"), ("per_page", "0")]))
            .unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
    }

    #[test]
    fn test_offset() {
        let config = PaginationConfig::default();
        let p = Pagination::from_query(&config, &params(&[("page", "3"), ("per_page", "10")]))
            .unwrap();
        assert_eq!(p.window(), Page::new(20, 10));
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        let config = PaginationConfig::default();
        assert!(Pagination::from_query(&config, &params(&[("page", "two")])).is_err());
    }

    #[test]
    fn test_page_count_rounds_up() {
        let config = PaginationConfig::default();
        let p = Pagination::from_query(&config, &params(&[("per_page", "10")])).unwrap();

        let response = p.respond(Paged::new(vec![1, 2, 3], 21));
        assert_eq!(response.page_count, 3);
        assert_eq!(response.total_items, 21);

        let response = p.respond(Paged::<i32>::new(vec![], 0));
        assert_eq!(response.page_count, 0);
    }
}

//! Pagination and sorting primitives for read operations.

use core::str::FromStr;
use serde::Serialize;

use crate::error::DomainError;

/// A validated page request: zero-based page index, positive page size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 10;

    /// Build a page request, rejecting `size == 0`.
    pub fn new(page: usize, size: usize) -> Result<Self, DomainError> {
        if size == 0 {
            return Err(DomainError::validation("page size must be positive"));
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// Sortable job fields exposed through the query surface.
///
/// Parsing fails closed: an unknown key is a validation error rather than a
/// pass-through into the storage layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    CompanyName,
    SalaryMin,
    SalaryMax,
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            "companyName" => Ok(Self::CompanyName),
            "salaryMin" => Ok(Self::SalaryMin),
            "salaryMax" => Ok(Self::SalaryMax),
            other => Err(DomainError::validation(format!(
                "unknown sort key: {other}"
            ))),
        }
    }
}

/// Sort direction; defaults to newest-first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDir {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(DomainError::validation(format!(
                "sort direction must be asc or desc, got {s}"
            )))
        }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice an already-filtered, already-sorted collection into a page.
    pub fn from_sorted(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(request.size());

        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.size())
            .collect();

        Self {
            items,
            page: request.page(),
            size: request.size(),
            total_elements,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_size_is_rejected() {
        let err = PageRequest::new(0, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn paging_slices_and_counts() {
        let page = Page::from_sorted((0..25).collect(), PageRequest::new(2, 10).unwrap());
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Page::from_sorted(vec![1, 2, 3], PageRequest::new(5, 10).unwrap());
        assert!(page.items.is_empty());
        assert_eq!(page.total_elements, 3);
    }

    #[test]
    fn unknown_sort_key_fails_closed() {
        assert!("salary".parse::<SortKey>().is_err());
        assert_eq!("createdAt".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
    }
}

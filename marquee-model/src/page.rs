//! Paging envelope and request descriptors.

use serde::{Deserialize, Deserializer, Serialize};

/// Largest page the catalog backend serves per request.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page request: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
}

impl PageRequest {
    /// Both fields are clamped to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// First page with the given size.
    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    /// `page` / `limit` query pairs.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [("page", self.page.to_string()), ("limit", self.limit.to_string())]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Pagination metadata; every field may be missing on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page this response answers.
    #[serde(default)]
    pub current_page: Option<u32>,
    /// Pages available for the query.
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Items available for the query.
    #[serde(default)]
    pub total_items: Option<u64>,
}

/// One page of entities.
///
/// List endpoints answer either `{ "data": [...], "pagination": {...} }` or a
/// bare JSON array; both decode to a `Page`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Entities in server order.
    pub data: Vec<T>,
    /// Paging metadata when the server sent it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    /// Page without metadata.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            pagination: None,
        }
    }

    /// Attach metadata.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Number of entities on this page.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the page holds no entities.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entities, dropping the metadata.
    pub fn into_items(self) -> Vec<T> {
        self.data
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageBody<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(default = "Vec::new", deserialize_with = "crate::wire::null_as_default")]
        data: Vec<T>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
}

impl<'de, T> Deserialize<'de> for Page<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PageBody::deserialize(deserializer)? {
            PageBody::Bare(data) => Page {
                data,
                pagination: None,
            },
            PageBody::Wrapped { data, pagination } => Page { data, pagination },
        })
    }
}

/// Fixed-size display pages over an in-memory result list.
#[derive(Debug, Clone, Copy)]
pub struct LocalPages<'a, T> {
    items: &'a [T],
    per_page: usize,
}

impl<'a, T> LocalPages<'a, T> {
    /// `per_page` is clamped to at least 1.
    pub fn new(items: &'a [T], per_page: usize) -> Self {
        Self {
            items,
            per_page: per_page.max(1),
        }
    }

    /// Number of display pages; zero for an empty list.
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.per_page)
    }

    /// Items on 1-based `page`; empty when out of range.
    pub fn page(&self, page: usize) -> &'a [T] {
        if page == 0 {
            return &[];
        }
        let start = (page - 1).saturating_mul(self.per_page);
        if start >= self.items.len() {
            return &[];
        }
        let end = (start + self.per_page).min(self.items.len());
        &self.items[start..end]
    }
}

use bon::Builder;

use crate::domain::errors::FieldError;

/// Storefront filters for product queries.
///
/// Text filters match case-insensitively. Price bounds are inclusive and
/// apply independently.
#[derive(Debug, Clone, PartialEq, Default, Builder)]
pub struct ProductFilter {
    /// Name of the product's category
    #[builder(into)]
    pub category: Option<String>,
    #[builder(into)]
    pub tag: Option<String>,
    /// Substring of the product name
    #[builder(into)]
    pub search: Option<String>,
    /// Name of the product's size
    #[builder(into)]
    pub size: Option<String>,
    /// Name of any color linked to the product
    #[builder(into)]
    pub color: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price_matches(&self, price: f64) -> bool {
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }

    /// The filter with blank strings treated as absent
    pub fn normalized(self) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            category: clean(self.category),
            tag: clean(self.tag).map(|t| t.to_lowercase()),
            search: clean(self.search),
            size: clean(self.size),
            color: clean(self.color),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

/// Requested page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Page size of the generic product listing
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Page size of storefront category and tag listings
    pub const STOREFRONT_LIMIT: u32 = 16;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Result<Self, FieldError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if page == 0 {
            return Err(FieldError::new("page", "page must be at least 1"));
        }

        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(FieldError::new(
                "limit",
                format!("limit must be between 1 and {}", Self::MAX_LIMIT),
            ));
        }

        Ok(Self { page, limit })
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the size of the full result set
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit as u64)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

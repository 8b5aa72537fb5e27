use serde::{Deserialize, Serialize};

/// Requested page of a listing, taken from query parameters with sensible
/// defaults. Page numbers start at 1.
#[derive(Debug, Clone, Copy, FromForm, UriDisplayQuery)]
pub struct PaginationRequest {
    #[field(default = 1)]
    pub page_num: u32,
    #[field(default = 50)]
    pub page_size: u32,
}

impl PaginationRequest {
    /// How many records precede the requested page.
    pub fn skip(&self) -> u32 {
        self.page_num.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Attach the page contents and overall total to form a response.
    pub fn to_paginated<T>(self, total: u64, items: Vec<T>) -> Paginated<T> {
        Paginated {
            items,
            pagination: PaginationInfo {
                page_num: self.page_num,
                page_size: self.page_size,
                total,
            },
        }
    }
}

/// One page of results plus the pagination metadata needed to fetch the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page_num: u32,
    pub page_size: u32,
    pub total: u64,
}

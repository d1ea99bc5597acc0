//! Page-number pagination over a newest-first listing.

use serde::{Deserialize, Serialize};

use super::todo::Todo;

pub const DEFAULT_PAGE: u32 = 1;
/// Page size the server applies when the caller gives none.
pub const DEFAULT_SERVER_LIMIT: u32 = 2;
/// Page size the client feed asks for.
pub const DEFAULT_CLIENT_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("`page` must be a positive number")]
    ZeroPage,
    #[error("`limit` must be a positive number")]
    ZeroLimit,
}

/// A 1-indexed page of `limit` records. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, PageError> {
        if page == 0 { return Err(PageError::ZeroPage); }
        if limit == 0 { return Err(PageError::ZeroLimit); }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 { self.page }
    pub fn limit(&self) -> u32 { self.limit }

    /// Index of the first record on this page.
    pub fn offset(&self) -> usize { (self.page as usize - 1).saturating_mul(self.limit as usize) }

    /// `ceil(total / limit)`; zero when there are no records.
    pub fn pages_for(&self, total: usize) -> usize { total.div_ceil(self.limit as usize) }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_SERVER_LIMIT } }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPage {
    pub total: usize,
    pub pages: usize,
    pub todos: Vec<Todo>,
}

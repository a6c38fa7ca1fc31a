use crate::error::{ModelError, Result};
use crate::user::User;

/// One-based page selector for collection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 10;

    pub fn new(page: u32, per_page: u32) -> Result<Self> {
        if page == 0 {
            return Err(ModelError::InvalidPage(page));
        }
        if per_page == 0 {
            return Err(ModelError::InvalidPageSize(per_page));
        }
        Ok(Self { page, per_page })
    }

    pub fn first(per_page: u32) -> Result<Self> {
        Self::new(1, per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// A page of users plus the collection total reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersPage {
    pub users: Vec<User>,
    pub total_count: u64,
    pub request: PageRequest,
}

impl UsersPage {
    pub fn new(users: Vec<User>, total_count: u64, request: PageRequest) -> Self {
        Self {
            users,
            total_count,
            request,
        }
    }

    /// Last available page; an empty collection still has page 1.
    pub fn last_page(&self) -> u32 {
        let per_page = u64::from(self.request.per_page);
        let pages = self.total_count.div_ceil(per_page).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.request.page < self.last_page()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, page: u32) -> UsersPage {
        UsersPage::new(Vec::new(), total, PageRequest::new(page, 10).unwrap())
    }

    #[test]
    fn rejects_zero_page_and_size() {
        assert_eq!(PageRequest::new(0, 10), Err(ModelError::InvalidPage(0)));
        assert_eq!(PageRequest::new(1, 0), Err(ModelError::InvalidPageSize(0)));
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(page(0, 1).last_page(), 1);
        assert_eq!(page(10, 1).last_page(), 1);
        assert_eq!(page(11, 1).last_page(), 2);
        assert_eq!(page(200, 1).last_page(), 20);
    }

    #[test]
    fn has_next_stops_at_last_page() {
        assert!(page(25, 2).has_next());
        assert!(!page(25, 3).has_next());
    }
}

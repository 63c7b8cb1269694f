// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;
// Acima disso a página é sempre vazia, e o OFFSET fica longe do limite do i64
pub const MAX_PAGE: i64 = 1_000_000;

// ?page=2&per_page=20
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// Página de resultados no formato que o frontend já consome.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, query: &PageQuery, total: i64) -> Self {
        let per_page = query.per_page();
        let last_page = ((total + per_page - 1) / per_page).max(1);
        Self {
            data,
            current_page: query.page(),
            per_page,
            total,
            last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let q = PageQuery::default();
        assert_eq!((q.page(), q.per_page(), q.offset()), (1, 10, 0));

        let q = PageQuery { page: Some(0), per_page: Some(1000) };
        assert_eq!((q.page(), q.per_page()), (1, MAX_PER_PAGE));

        let q = PageQuery { page: Some(3), per_page: Some(20) };
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn huge_page_numbers_are_clamped() {
        let q = PageQuery { page: Some(i64::MAX), per_page: Some(i64::MAX) };
        assert_eq!(q.page(), MAX_PAGE);
        assert_eq!(q.offset(), (MAX_PAGE - 1) * MAX_PER_PAGE);

        let q = PageQuery { page: Some(i64::MIN), per_page: None };
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn last_page_rounds_up_and_is_never_zero() {
        let q = PageQuery::default();
        assert_eq!(Page::<()>::new(vec![], &q, 0).last_page, 1);
        assert_eq!(Page::<()>::new(vec![], &q, 10).last_page, 1);
        assert_eq!(Page::<()>::new(vec![], &q, 11).last_page, 2);
    }
}

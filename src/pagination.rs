use serde::Deserialize;

use crate::server::deserializers::lenient_page;

pub const QUESTIONS_PER_PAGE: i64 = 10;

/// 1-based page number taken from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default = "first_page", deserialize_with = "lenient_page")]
    pub page: u32,
}

pub(crate) fn first_page() -> u32 {
    1
}

impl Default for Page {
    fn default() -> Self {
        Self::first()
    }
}

impl Page {
    pub fn first() -> Self {
        Page { page: first_page() }
    }

    pub fn new(page: u32) -> Self {
        Page { page }
    }

    /// Row offset of the page. Page 0 lies before the first row and holds nothing.
    pub fn offset(&self) -> Option<i64> {
        self.page
            .checked_sub(1)
            .map(|p| i64::from(p) * QUESTIONS_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        QUESTIONS_PER_PAGE
    }

    /// Cuts this page out of an already ordered result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let Some(offset) = self.offset() else {
            return vec![];
        };
        items
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(QUESTIONS_PER_PAGE as usize)
            .collect()
    }
}

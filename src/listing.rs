// Client-side search, sort and pagination over in-memory lists

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Items that can be searched and sorted by a [`ListQuery`]
pub trait Listable {
    type SortKey: Copy;

    /// Text fields matched by a case-insensitive substring search
    fn search_fields(&self) -> Vec<&str>;

    fn compare_by(&self, other: &Self, key: Self::SortKey) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct ListQuery<K> {
    pub search: Option<String>,
    pub sort: Option<(K, SortDirection)>,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl<K> Default for ListQuery<K> {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            page: 1,
            page_size: 25,
        }
    }
}

impl<K> ListQuery<K> {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sorted(mut self, key: K, direction: SortDirection) -> Self {
        self.sort = Some((key, direction));
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    /// Items matching the search, across all pages
    pub total_matches: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Case-insensitive substring match; an empty needle matches everything
pub fn matches_search<T: Listable>(item: &T, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Filter without reordering or paging
pub fn filter<'a, T: Listable>(items: &'a [T], needle: &str) -> Vec<&'a T> {
    items.iter().filter(|item| matches_search(*item, needle)).collect()
}

/// Apply search, stable sort and pagination. Out-of-range pages are empty.
pub fn apply<T: Listable + Clone>(items: &[T], query: &ListQuery<T::SortKey>) -> Page<T> {
    let mut matched: Vec<&T> = match &query.search {
        Some(needle) => filter(items, needle),
        None => items.iter().collect(),
    };

    if let Some((key, direction)) = query.sort {
        matched.sort_by(|a, b| {
            let ordering = a.compare_by(b, key);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    let page_size = query.page_size.max(1);
    let page = query.page.max(1);
    let total_matches = matched.len();
    let total_pages = total_matches.div_ceil(page_size);

    let items = matched
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        page,
        page_size,
        total_matches,
        total_pages,
    }
}

//! Cursor pagination types for list operations.
//!
//! Lists are paged by document id: the cursor is the id of the last item
//! of the previous page, and the next query starts after it.

use serde::{Deserialize, Serialize};

/// A request for a page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorRequest {
    /// Requested page size. Clamped to [`CursorRequest::MAX_LIMIT`].
    #[serde(default)]
    pub limit: Option<usize>,
    /// Id of the last item of the previous page.
    #[serde(default)]
    pub cursor: Option<String>,
}

impl CursorRequest {
    /// The default page size.
    pub const DEFAULT_LIMIT: usize = 20;
    /// The maximum allowed page size.
    pub const MAX_LIMIT: usize = 100;

    /// Creates a cursor request.
    #[must_use]
    pub fn new(limit: usize, cursor: Option<String>) -> Self {
        Self {
            limit: Some(limit),
            cursor,
        }
    }

    /// Request for the first page with the default size.
    #[must_use]
    pub fn first() -> Self {
        Self::default()
    }

    /// Effective page size, always in `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Cursor, ignoring empty strings.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }

    /// Number of items to fetch to know whether another page exists.
    #[must_use]
    pub fn fetch_limit(&self) -> usize {
        self.limit() + 1
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Cursor for the next page, absent on the last page.
    pub next_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    /// Creates an empty last page.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Builds a page from up to `limit + 1` fetched items.
    ///
    /// If more than `limit` items were fetched the surplus is dropped and the
    /// cursor points at the last kept item.
    #[must_use]
    pub fn from_fetched<F>(mut items: Vec<T>, limit: usize, cursor_of: F) -> Self
    where
        F: Fn(&T) -> String,
    {
        if items.len() > limit {
            items.truncate(limit);
            let next_cursor = items.last().map(&cursor_of);
            Self { items, next_cursor }
        } else {
            Self::new(items, None)
        }
    }

    /// Maps the page items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> CursorPage<U> {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }

    /// Returns true if the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether another page exists.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

impl<T> Default for CursorPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(CursorRequest::first().limit(), CursorRequest::DEFAULT_LIMIT);
        assert_eq!(CursorRequest::new(500, None).limit(), CursorRequest::MAX_LIMIT);
        assert_eq!(CursorRequest::new(0, None).limit(), 1);
        assert_eq!(CursorRequest::new(10, None).fetch_limit(), 11);
    }

    #[test]
    fn test_empty_cursor_is_ignored() {
        let request = CursorRequest::new(5, Some(String::new()));
        assert!(request.cursor().is_none());
    }

    #[test]
    fn test_from_fetched_with_more_items() {
        let page = CursorPage::from_fetched(vec![1, 2, 3, 4], 3, ToString::to_string);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.next_cursor.as_deref(), Some("3"));
        assert!(page.has_more());
    }

    #[test]
    fn test_from_fetched_last_page() {
        let page = CursorPage::from_fetched(vec![1, 2], 3, ToString::to_string);
        assert_eq!(page.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_map_keeps_cursor() {
        let page = CursorPage::new(vec![1, 2], Some("2".to_string())).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.next_cursor.as_deref(), Some("2"));
    }
}

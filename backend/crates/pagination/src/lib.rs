//! Limit/offset pagination primitives shared by Foodgram list endpoints.
//!
//! Endpoints accept `limit` together with either a zero-based `offset` or a
//! one-based `page`, and answer with a [`Paginated`] envelope:
//!
//! ```json
//! {"count": 12, "next": "https://h/api/recipes/?limit=6&offset=6", "previous": null, "results": []}
//! ```
//!
//! Adapters fetch a [`Page`] for a [`PageRequest`]; inbound handlers turn the
//! page into an envelope with absolute navigation links.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use url::Url;

/// Page size applied when the client does not send `limit`.
pub const DEFAULT_LIMIT: u32 = 6;
/// Upper bound for `limit`; larger values are clamped.
pub const MAX_LIMIT: u32 = 100;

const LIMIT_PARAM: &str = "limit";
const OFFSET_PARAM: &str = "offset";
const PAGE_PARAM: &str = "page";

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// `limit` was zero.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// `page` was zero; pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// Both `page` and `offset` were supplied.
    #[error("page and offset cannot be combined")]
    PageAndOffset,
}

/// A validated window into an ordered collection.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::from_params(Some(10), None, Some(3)).expect("valid page");
/// assert_eq!(request.offset(), 20);
/// assert_eq!(request.limit(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Build a request from an explicit limit and offset.
    ///
    /// Limits above [`MAX_LIMIT`] are clamped.
    pub fn new(limit: u32, offset: u64) -> Result<Self, PaginationError> {
        if limit == 0 {
            return Err(PaginationError::ZeroLimit);
        }
        Ok(Self {
            limit: limit.min(MAX_LIMIT),
            offset,
        })
    }

    /// Build a request from raw query parameters.
    ///
    /// `page` is one-based and translated into an offset of
    /// `(page - 1) * limit`.
    pub fn from_params(
        limit: Option<u32>,
        offset: Option<u64>,
        page: Option<u64>,
    ) -> Result<Self, PaginationError> {
        let size = limit.unwrap_or(DEFAULT_LIMIT);
        match (offset, page) {
            (Some(_), Some(_)) => Err(PaginationError::PageAndOffset),
            (Some(skip), None) => Self::new(size, skip),
            (None, Some(0)) => Err(PaginationError::ZeroPage),
            (None, Some(number)) => {
                let request = Self::new(size, 0)?;
                Ok(Self {
                    offset: number.saturating_sub(1).saturating_mul(u64::from(request.limit)),
                    ..request
                })
            }
            (None, None) => Self::new(size, 0),
        }
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Index range covered by this request within a collection of `total`
    /// items. The range is empty when the offset lies past the end.
    #[must_use]
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(total);
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(total);
        start..end
    }

    fn next_offset(&self, total: u64) -> Option<u64> {
        let next = self.offset.saturating_add(u64::from(self.limit));
        (next < total).then_some(next)
    }

    fn previous_offset(&self) -> Option<u64> {
        (self.offset > 0).then(|| self.offset.saturating_sub(u64::from(self.limit)))
    }
}

/// One page of results plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
}

impl<T> Page<T> {
    /// Wrap the items of one page and the collection size.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// A page with no items in an empty collection.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Slice an in-memory, already ordered collection.
    #[must_use]
    pub fn from_slice(all: &[T], request: PageRequest) -> Self
    where
        T: Clone,
    {
        let window = request.window(all.len());
        let items = all.get(window).map(<[T]>::to_vec).unwrap_or_default();
        Self::new(items, u64::try_from(all.len()).unwrap_or(u64::MAX))
    }

    /// Items of this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Size of the whole collection.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Transform every item while keeping the total.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Response envelope returned by paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Size of the whole collection.
    pub count: u64,
    /// Absolute link to the next page, if any.
    pub next: Option<String>,
    /// Absolute link to the previous page, if any.
    pub previous: Option<String>,
    /// Items of the current page.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build an envelope for `page`, deriving navigation links from the URL
    /// of the current request. Query parameters other than `limit`, `offset`
    /// and `page` are preserved.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest, Paginated};
    /// use url::Url;
    ///
    /// let base = Url::parse("http://localhost/api/recipes/?author=1").expect("url");
    /// let request = PageRequest::new(2, 0).expect("request");
    /// let envelope = Paginated::from_page(Page::new(vec![1, 2], 5), request, &base);
    /// assert_eq!(
    ///     envelope.next.as_deref(),
    ///     Some("http://localhost/api/recipes/?author=1&limit=2&offset=2")
    /// );
    /// assert!(envelope.previous.is_none());
    /// ```
    #[must_use]
    pub fn from_page(page: Page<T>, request: PageRequest, base: &Url) -> Self {
        let next = request
            .next_offset(page.total)
            .map(|offset| link(base, request.limit, Some(offset)));
        let previous = request
            .previous_offset()
            .map(|offset| link(base, request.limit, (offset > 0).then_some(offset)));
        Self {
            count: page.total,
            next,
            previous,
            results: page.items,
        }
    }
}

fn link(base: &Url, limit: u32, offset: Option<u64>) -> String {
    let preserved: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != LIMIT_PARAM && key != OFFSET_PARAM && key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &preserved {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(LIMIT_PARAM, &limit.to_string());
        if let Some(skip) = offset {
            pairs.append_pair(OFFSET_PARAM, &skip.to_string());
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page arithmetic and link building.

    use super::*;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("http://localhost/api/users/").expect("base url")
    }

    #[rstest]
    #[case(None, None, None, DEFAULT_LIMIT, 0)]
    #[case(Some(10), Some(30), None, 10, 30)]
    #[case(Some(5), None, Some(1), 5, 0)]
    #[case(Some(5), None, Some(4), 5, 15)]
    #[case(Some(500), None, None, MAX_LIMIT, 0)]
    fn builds_requests_from_params(
        #[case] limit: Option<u32>,
        #[case] offset: Option<u64>,
        #[case] page: Option<u64>,
        #[case] expected_limit: u32,
        #[case] expected_offset: u64,
    ) {
        let request = PageRequest::from_params(limit, offset, page).expect("valid params");
        assert_eq!(request.limit(), expected_limit);
        assert_eq!(request.offset(), expected_offset);
    }

    #[rstest]
    #[case(Some(0), None, None, PaginationError::ZeroLimit)]
    #[case(None, None, Some(0), PaginationError::ZeroPage)]
    #[case(None, Some(3), Some(2), PaginationError::PageAndOffset)]
    fn rejects_invalid_params(
        #[case] limit: Option<u32>,
        #[case] offset: Option<u64>,
        #[case] page: Option<u64>,
        #[case] expected: PaginationError,
    ) {
        let err = PageRequest::from_params(limit, offset, page).expect_err("invalid params");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn window_is_clamped_to_collection() {
        let request = PageRequest::new(4, 6).expect("request");
        assert_eq!(request.window(8), 6..8);
        assert_eq!(request.window(3), 3..3);
    }

    #[rstest]
    fn slices_in_memory_collections() {
        let all = vec!["a", "b", "c", "d", "e"];
        let page = Page::from_slice(&all, PageRequest::new(2, 2).expect("request"));
        assert_eq!(page.items(), &["c", "d"]);
        assert_eq!(page.total(), 5);
    }

    #[rstest]
    fn middle_page_links_both_ways() {
        let request = PageRequest::new(2, 4).expect("request");
        let envelope = Paginated::from_page(Page::new(vec![5, 6], 9), request, &base());

        assert_eq!(envelope.count, 9);
        assert_eq!(
            envelope.next.as_deref(),
            Some("http://localhost/api/users/?limit=2&offset=6")
        );
        assert_eq!(
            envelope.previous.as_deref(),
            Some("http://localhost/api/users/?limit=2&offset=2")
        );
    }

    #[rstest]
    fn second_page_previous_link_drops_offset() {
        let request = PageRequest::new(3, 3).expect("request");
        let envelope = Paginated::from_page(Page::new(vec![4], 4), request, &base());

        assert!(envelope.next.is_none());
        assert_eq!(
            envelope.previous.as_deref(),
            Some("http://localhost/api/users/?limit=3")
        );
    }

    #[rstest]
    fn page_param_is_replaced_by_offset() {
        let base = Url::parse("http://localhost/api/recipes/?page=2&tags=lunch&limit=1")
            .expect("base url");
        let request = PageRequest::from_params(Some(1), None, Some(2)).expect("request");
        let envelope = Paginated::from_page(Page::new(vec![2], 3), request, &base);

        assert_eq!(
            envelope.next.as_deref(),
            Some("http://localhost/api/recipes/?tags=lunch&limit=1&offset=2")
        );
    }

    #[rstest]
    fn envelope_serialises_with_wire_field_names() {
        let envelope = Paginated::from_page(Page::<u8>::empty(), PageRequest::default(), &base());
        let value = serde_json::to_value(&envelope).expect("serialise");
        assert_eq!(
            value,
            serde_json::json!({"count": 0, "next": null, "previous": null, "results": []})
        );
    }
}

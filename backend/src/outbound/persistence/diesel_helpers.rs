//! Shared helpers for Diesel repository implementations.
//!
//! - page window conversion between [`PageRequest`] and SQL `LIMIT`/`OFFSET`
//! - row count conversion
//! - row conversion collection with a repository-specific error

use pagination::PageRequest;

/// SQL `LIMIT` and `OFFSET` values for a page request.
pub fn page_bounds(page: PageRequest) -> (i64, i64) {
    let limit = i64::from(page.limit());
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

/// Convert a `COUNT(*)` result into the unsigned total used by pages.
pub fn row_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

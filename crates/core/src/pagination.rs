//! Offset/limit arithmetic and page counting.
//!
//! Pages are 1-indexed. Two tiers exist: the server-side tier converts
//! (page, page_size) into a range the remote store applies, and the
//! client-side tier ([`slice_page`]) re-slices an already-refined full
//! result set when a free-text query forced a full fetch.

use crate::fossil::Fossil;

/// Convert a 1-indexed page into an `(offset, limit)` window.
///
/// Pages below 1 are clamped to 1.
pub fn page_range(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.max(1);
    ((page - 1) * page_size, page_size)
}

/// Inclusive end of the window, for range-style remote APIs.
pub fn inclusive_end(offset: i64, page_size: i64) -> i64 {
    offset + page_size - 1
}

/// Total page count: `ceil(total_count / page_size)`. Zero rows, zero pages.
pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

/// Take the requested page out of an already-refined full result set.
pub fn slice_page(items: Vec<Fossil>, page: i64, page_size: i64) -> Vec<Fossil> {
    let (offset, limit) = page_range(page, page_size);
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

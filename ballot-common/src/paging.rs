//! Page-group pagination for listing endpoints
//!
//! Listings show a fixed number of items per page, and the pager itself shows
//! a bounded window ("group") of page links rather than every page number.
//! With ten pages per group, page 15 sits in the group 11..=20; the pager then
//! offers one link back to page 10 (the last page of the previous group) and
//! one forward to page 21 (the first page of the next group).

use thiserror::Error;

/// Items per listing page when the settings table has no override
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page links per pager group when the settings table has no override
pub const DEFAULT_GROUP_SIZE: u32 = 10;

/// Pagination errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagingError {
    /// Requested page outside `[1, total_pages]`.
    ///
    /// Deliberately surfaced instead of clamping; the caller decides whether
    /// to clamp, redirect, or report it.
    #[error("page {requested} out of range (valid pages 1..={total_pages})")]
    PageOutOfRange { requested: u32, total_pages: u32 },

    /// The collection needs more pages than a `u32` can number.
    #[error("{total_items} items at {page_size} per page exceed the maximum page count")]
    TooManyPages { total_items: u64, page_size: u32 },
}

/// Pager metadata calculated for one requested page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Requested page number (1-indexed, validated)
    pub page: u32,
    /// Total number of records across all pages
    pub total_items: u64,
    /// Total number of pages (an empty collection still has one empty page)
    pub total_pages: u32,
    /// Offset of the first record on this page, for SQL LIMIT/OFFSET queries
    pub offset: u64,
    /// Maximum records on this page (the page size)
    pub limit: u32,
    /// Page numbers of the group this page belongs to, in ascending order
    pub page_range: Vec<u32>,
    /// Last page of the previous group, when one exists
    pub previous_group_page: Option<u32>,
    /// First page of the next group, when one exists
    pub next_group_page: Option<u32>,
}

/// Calculate the pager window for a requested page
///
/// `page_size` and `group_size` must be at least 1. A `requested_page` of 0 or
/// beyond the last page is an error, never silently corrected, as is a
/// collection whose page count does not fit in `u32`.
///
/// # Examples
/// ```
/// use ballot_common::paging::page_window;
///
/// // 250 items, 10 per page, groups of 10 pages: page 15 sits in group 11..=20
/// let w = page_window(250, 10, 10, 15).unwrap();
/// assert_eq!(w.total_pages, 25);
/// assert_eq!(w.page_range, (11..=20).collect::<Vec<u32>>());
/// assert_eq!(w.previous_group_page, Some(10));
/// assert_eq!(w.next_group_page, Some(21));
/// assert_eq!(w.offset, 140);
///
/// // Page 11 of 10 pages does not exist
/// assert!(page_window(95, 10, 10, 11).is_err());
/// ```
pub fn page_window(
    total_items: u64,
    page_size: u32,
    group_size: u32,
    requested_page: u32,
) -> Result<PageWindow, PagingError> {
    assert!(page_size >= 1, "page_size must be at least 1");
    assert!(group_size >= 1, "group_size must be at least 1");

    // An empty collection still renders as a single empty page. The count
    // stays in u64 until the checked conversion so oversized collections
    // error instead of wrapping.
    let pages = total_items.div_ceil(page_size as u64).max(1);
    let total_pages = u32::try_from(pages).map_err(|_| PagingError::TooManyPages {
        total_items,
        page_size,
    })?;

    if requested_page == 0 || requested_page > total_pages {
        return Err(PagingError::PageOutOfRange {
            requested: requested_page,
            total_pages,
        });
    }

    let group_start = ((requested_page - 1) / group_size) * group_size;
    // Widened add: group_start + group_size can pass u32::MAX when the last
    // group butts against the page-count ceiling.
    let group_end = (group_start as u64 + group_size as u64).min(total_pages as u64) as u32;

    Ok(PageWindow {
        page: requested_page,
        total_items,
        total_pages,
        offset: (requested_page as u64 - 1) * page_size as u64,
        limit: page_size,
        page_range: (group_start + 1..=group_end).collect(),
        // group_start is itself a valid page number exactly when the group
        // does not begin at page 1
        previous_group_page: (group_start >= 1).then_some(group_start),
        next_group_page: (group_end < total_pages).then(|| group_end + 1),
    })
}

/// Ordered, countable collection that can produce one page of records
///
/// Listing handlers that go through SQL count and slice with COUNT/LIMIT/OFFSET
/// instead; this interface serves in-memory collections.
pub trait PageSource {
    type Item;

    /// Total number of records
    fn total(&self) -> u64;

    /// Records in `[offset, offset + limit)`, clamped to the collection
    fn fetch(&self, offset: u64, limit: u32) -> Vec<Self::Item>;
}

impl<T: Clone> PageSource for [T] {
    type Item = T;

    fn total(&self) -> u64 {
        self.len() as u64
    }

    fn fetch(&self, offset: u64, limit: u32) -> Vec<T> {
        let start = (offset as usize).min(self.len());
        let end = start.saturating_add(limit as usize).min(self.len());
        self[start..end].to_vec()
    }
}

/// One page of records together with its pager metadata
#[derive(Debug, Clone)]
pub struct PageView<T> {
    /// Records belonging to the requested page, in source order
    pub items: Vec<T>,
    /// Pager metadata for rendering the group links
    pub window: PageWindow,
}

/// Slice one page out of a source and calculate its pager window
pub fn paginate<S: PageSource + ?Sized>(
    source: &S,
    page_size: u32,
    group_size: u32,
    requested_page: u32,
) -> Result<PageView<S::Item>, PagingError> {
    let window = page_window(source.total(), page_size, group_size, requested_page)?;
    let items = source.fetch(window.offset, window.limit);
    Ok(PageView { items, window })
}

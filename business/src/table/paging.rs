//! Pure pagination math for paged-list tables.

/// Display-oriented summary of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    /// 1-based index of the first visible row, 0 when the table is empty.
    pub current_from: u64,
    /// 1-based index of the last visible row.
    pub current_to: u64,
    /// Record count used for display and page math.
    pub total_for_display: u64,
    pub total_pages: u64,
    /// 1-based current page.
    pub current_page: u64,
}

impl PageSummary {
    /// Computes the summary from the controller's state and the endpoint's
    /// reported counts.
    ///
    /// `records_filtered` wins whenever it is non-zero. A backend reporting
    /// exactly 0 filtered records is indistinguishable from one omitting the
    /// field, so 0 falls back to `records_total`; see
    /// `fallback_when_filtered_is_zero` below.
    pub fn compute(
        page_index: usize,
        page_size: usize,
        records_total: u64,
        records_filtered: u64,
    ) -> Self {
        let total_for_display = if records_filtered != 0 {
            records_filtered
        } else {
            records_total
        };

        let total_pages = if page_size > 0 {
            total_for_display.div_ceil(page_size as u64).max(1)
        } else {
            1
        };

        let offset = (page_index as u64) * (page_size as u64);
        let current_from = if total_for_display == 0 { 0 } else { offset + 1 };
        let current_to = (offset + page_size as u64).min(total_for_display);

        Self {
            current_from,
            current_to,
            total_for_display,
            total_pages,
            current_page: page_index as u64 + 1,
        }
    }
}

/// Clamps a 1-based page target into `[1, total_pages]`.
pub fn clamp_page(target: u64, total_pages: u64) -> u64 {
    target.clamp(1, total_pages.max(1))
}

/// One entry of the compacted page-number control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u64),
    Ellipsis,
}

/// Page numbers to render, with ellipsis compaction past 7 pages.
///
/// Windows: near the start show the first five pages, near the end the last
/// five, otherwise the current page with one neighbor on each side.
pub fn page_items(total_pages: u64, current_page: u64) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total_pages <= 7 {
        return (1..=total_pages.max(1)).map(Page).collect();
    }

    if current_page <= 4 {
        let mut items: Vec<PageItem> = (1..=5).map(Page).collect();
        items.push(Ellipsis);
        items.push(Page(total_pages));
        return items;
    }

    if current_page >= total_pages - 3 {
        let mut items = vec![Page(1), Ellipsis];
        items.extend((total_pages - 4..=total_pages).map(Page));
        return items;
    }

    vec![
        Page(1),
        Ellipsis,
        Page(current_page - 1),
        Page(current_page),
        Page(current_page + 1),
        Ellipsis,
        Page(total_pages),
    ]
}

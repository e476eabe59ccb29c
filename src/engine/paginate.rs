use crate::models::{PageItem, ReconciledUser, View};

/// Largest page count shown without collapsing into a windowed strip.
const FULL_STRIP_MAX_PAGES: usize = 5;

/// Slices the filtered users into a page, clamping the requested page.
///
/// A `page_size` of zero is treated as one; `page` 0 becomes 1 and pages
/// past the end become the last page.
pub fn paginate(filtered: &[&ReconciledUser], page_size: usize, page: usize) -> View {
    let page_size = page_size.max(1);
    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(total_count);
    let end = (page * page_size).min(total_count);

    let rows = filtered[start..end].iter().map(|user| (*user).clone()).collect();

    View {
        rows,
        total_count,
        total_pages,
        page,
        page_size,
        pages: page_window(page, total_pages),
    }
}

/// Page numbers for the UI strip, with `Ellipsis` marking gaps.
pub fn page_window(page: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= FULL_STRIP_MAX_PAGES {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let mut items = Vec::with_capacity(7);
    if page <= 3 {
        items.extend((1..=4).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    } else if page >= total_pages - 2 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((total_pages - 3..=total_pages).map(PageItem::Page));
    } else {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((page - 1..=page + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    }
    items
}

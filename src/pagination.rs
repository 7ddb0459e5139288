// =============================================================================
// PAGINATION MODULE
// =============================================================================
// Slices a filtered + sorted list into pages and computes the compressed
// page-number controls ("1 2 3 4 5 … 100").
// =============================================================================

use serde::Serialize;

/// Page controls collapse to ellipses once there are more pages than this.
pub const MAX_UNCOMPRESSED_PAGES: usize = 7;

/// One visible page of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed page that was requested
    pub page: usize,
    pub page_size: usize,
    /// Number of rows before slicing
    pub total: usize,
    /// Never less than 1, even for an empty list
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Compressed page-number sequence for this page's controls.
    pub fn tokens(&self) -> Vec<PageToken> {
        page_tokens(self.page, self.total_pages)
    }
}

/// Total page count for `len` rows; at least 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Returns rows `(page-1)*page_size .. page*page_size`.
///
/// `page` is 1-indexed. Page 0 and pages past the end yield an empty slice,
/// and a page size of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let visible = match page.checked_sub(1) {
        Some(index) => {
            let start = index.saturating_mul(page_size).min(items.len());
            let end = start.saturating_add(page_size).min(items.len());
            items[start..end].to_vec()
        }
        None => Vec::new(),
    };

    Page {
        items: visible,
        page,
        page_size,
        total: items.len(),
        total_pages: total_pages(items.len(), page_size),
    }
}

// =============================================================================
// PAGE-NUMBER COMPRESSION
// =============================================================================

/// An entry of the page controls: a page number or an ellipsis marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageToken {
    Page(usize),
    Ellipsis(Gap),
}

/// Serializes as the literal string `"..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap;

impl Serialize for Gap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("...")
    }
}

impl PageToken {
    pub const ELLIPSIS: PageToken = PageToken::Ellipsis(Gap);
}

/// Builds the page controls for `current` out of `total` pages.
///
/// Up to 7 pages are all shown. Otherwise the first and last page are always
/// present, with a window around the current page and at most two ellipses:
/// `1 2 3 4 5 … N`, `1 … N-4 … N`, or `1 … c-1 c c+1 … N`.
pub fn page_tokens(current: usize, total: usize) -> Vec<PageToken> {
    let total = total.max(1);
    if total <= MAX_UNCOMPRESSED_PAGES {
        return (1..=total).map(PageToken::Page).collect();
    }

    let last = total;
    let mut tokens = Vec::with_capacity(MAX_UNCOMPRESSED_PAGES);

    if current <= 4 {
        tokens.extend((1..=5).map(PageToken::Page));
        tokens.push(PageToken::ELLIPSIS);
        tokens.push(PageToken::Page(last));
    } else if current >= last - 3 {
        tokens.push(PageToken::Page(1));
        tokens.push(PageToken::ELLIPSIS);
        tokens.extend((last - 4..=last).map(PageToken::Page));
    } else {
        tokens.push(PageToken::Page(1));
        tokens.push(PageToken::ELLIPSIS);
        tokens.extend((current - 1..=current + 1).map(PageToken::Page));
        tokens.push(PageToken::ELLIPSIS);
        tokens.push(PageToken::Page(last));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(tokens: &[PageToken]) -> Vec<usize> {
        tokens
            .iter()
            .filter_map(|token| match token {
                PageToken::Page(n) => Some(*n),
                PageToken::Ellipsis(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_list_has_one_page_and_no_items() {
        let page = paginate::<u32>(&[], 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_slices_requested_page() {
        let rows: Vec<u32> = (1..=25).collect();
        let page = paginate(&rows, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let rows: Vec<u32> = (1..=5).collect();
        assert!(paginate(&rows, 2, 5).items.is_empty());
        assert!(paginate(&rows, 0, 5).items.is_empty());
        assert!(paginate(&rows, usize::MAX, 5).items.is_empty());
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let rows = vec!['a', 'b'];
        let page = paginate(&rows, 2, 0);
        assert_eq!(page.items, vec!['b']);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_small_totals_show_every_page() {
        assert_eq!(pages(&page_tokens(3, 7)), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(page_tokens(1, 0), vec![PageToken::Page(1)]);
    }

    #[test]
    fn test_compression_near_start_middle_and_end() {
        assert_eq!(
            page_tokens(2, 100),
            vec![
                PageToken::Page(1),
                PageToken::Page(2),
                PageToken::Page(3),
                PageToken::Page(4),
                PageToken::Page(5),
                PageToken::ELLIPSIS,
                PageToken::Page(100),
            ]
        );
        assert_eq!(
            page_tokens(50, 100),
            vec![
                PageToken::Page(1),
                PageToken::ELLIPSIS,
                PageToken::Page(49),
                PageToken::Page(50),
                PageToken::Page(51),
                PageToken::ELLIPSIS,
                PageToken::Page(100),
            ]
        );
        assert_eq!(pages(&page_tokens(97, 100)), vec![1, 96, 97, 98, 99, 100]);
    }

    #[test]
    fn test_tokens_strictly_increase_with_at_most_two_ellipses() {
        for total in 1..=30 {
            for current in 1..=total {
                let tokens = page_tokens(current, total);
                let numbers = pages(&tokens);
                assert!(
                    numbers.windows(2).all(|w| w[0] < w[1]),
                    "current {} total {}: {:?}",
                    current,
                    total,
                    tokens
                );
                let gaps = tokens.len() - numbers.len();
                assert!(gaps <= 2);
                assert!(numbers.contains(&current));
                assert_eq!(numbers.first(), Some(&1));
                assert_eq!(numbers.last(), Some(&total));
            }
        }
    }

    #[test]
    fn test_ellipsis_serializes_as_marker() {
        let json = serde_json::to_string(&page_tokens(1, 9)).expect("tokens serialize");
        assert_eq!(json, r#"[1,2,3,4,5,"...",9]"#);
    }
}

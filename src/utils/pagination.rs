/// Resolved pagination window for a list query.
#[derive(Debug, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub total_pages: u32,
    pub offset: u64,
}

/// Clamps a requested page number into the valid range for `total` rows.
/// Page numbers are 1-based; requests past the end land on the last page,
/// zero lands on the first. An empty result set still reports one page.
pub fn clamp_page(requested: u32, total: i64, page_size: u32) -> Page {
    let total = total.max(0) as u64;
    let page_size = page_size.max(1);
    let total_pages = (total.div_ceil(page_size as u64)).max(1) as u32;
    let page = requested.clamp(1, total_pages);

    Page {
        page,
        total_pages,
        offset: (page as u64 - 1) * page_size as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_empty_set() {
        let p = clamp_page(1, 0, 10);
        assert_eq!(p, Page { page: 1, total_pages: 1, offset: 0 });
    }

    #[test]
    fn zero_clamps_to_first_page() {
        let p = clamp_page(0, 25, 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn overshoot_clamps_to_last_page() {
        let p = clamp_page(99, 25, 10);
        assert_eq!(p, Page { page: 3, total_pages: 3, offset: 20 });
    }

    #[test]
    fn exact_boundary() {
        let p = clamp_page(2, 20, 10);
        assert_eq!(p, Page { page: 2, total_pages: 2, offset: 10 });
    }
}

//! Filtering and paging over a lead list for table display.

use crate::types::lead::Lead;

/// Rows shown per table page.
pub const ITEMS_PER_PAGE: usize = 12;

/// Leads with any populated field containing `needle`, case-insensitively.
///
/// An empty (or all-whitespace) needle matches everything.
pub fn filter_leads<'a>(leads: &'a [Lead], needle: &str) -> Vec<&'a Lead> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return leads.iter().collect();
    }

    leads
        .iter()
        .filter(|lead| {
            lead.populated()
                .any(|(_, value)| value.to_lowercase().contains(&needle))
        })
        .collect()
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// One-based page number, clamped into range
    pub page: usize,
    /// Always at least 1
    pub total_pages: usize,
    /// Items across all pages
    pub total: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into page `page` (one-based) of `per_page` items.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leads() -> Vec<Lead> {
        vec![
            Lead::new("1").with_name("Ada Lovelace").with_company("Analytical"),
            Lead::new("2").with_name("Bob").with_detail("rating", "4.9 stars"),
            Lead::new("3").with_email("CAROL@ANALYTICAL.IO"),
        ]
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let leads = leads();

        let ids: Vec<&str> = filter_leads(&leads, "analytical")
            .into_iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);

        assert_eq!(filter_leads(&leads, "STARS").len(), 1);
        assert_eq!(filter_leads(&leads, "  ").len(), 3);
    }

    #[test]
    fn filter_ignores_id() {
        let leads = leads();
        assert!(filter_leads(&leads, "2").is_empty());
    }

    #[test]
    fn paginate_clamps_page() {
        let items: Vec<usize> = (0..30).collect();

        let first = paginate(&items, 0, ITEMS_PER_PAGE);
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 12);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());

        let last = paginate(&items, 99, ITEMS_PER_PAGE);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, (24..30).collect::<Vec<_>>());
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let page = paginate::<Lead>(&[], 3, ITEMS_PER_PAGE);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }
}

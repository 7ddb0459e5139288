// =============================================================================
// LIST STATE MODULE
// =============================================================================
// The state behind one list screen and the filter -> sort -> paginate
// pipeline that turns raw rows into the visible page.
//
// LEARNING NOTE:
// Every setter that changes what rows are visible (filters, sort, page size)
// resets the page to 1, so a user can never be left on a page that no
// longer exists.
// =============================================================================

use crate::pagination::{paginate, Page};
use crate::search::RecordFilter;
use crate::sorting::{sort_records, SortState, Sortable};

/// Default rows per page on the console's list screens.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<F, K> {
    filter: F,
    sort: SortState<K>,
    page: usize,
    page_size: usize,
}

impl<F, K: Copy + PartialEq> ListState<F, K> {
    pub fn new(filter: F, sort: SortState<K>, page_size: usize) -> Self {
        Self {
            filter,
            sort,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn sort(&self) -> &SortState<K> {
        &self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
        self.page = 1;
    }

    /// Edit the filter in place; the page resets like any other filter change.
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filter);
        self.page = 1;
    }

    /// Header click on `key` (see [`SortState::toggle`]).
    pub fn toggle_sort(&mut self, key: K) {
        self.sort.toggle(key);
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortState<K>) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Page navigation. Values below 1 are clamped to 1.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Filter, sort and paginate `rows`. Pure: same inputs, same page.
    pub fn run<T>(&self, rows: &[T]) -> Page<T>
    where
        F: RecordFilter<T>,
        T: Sortable<K> + Clone,
    {
        let mut visible: Vec<T> = rows
            .iter()
            .filter(|row| self.filter.accepts(row))
            .cloned()
            .collect();
        sort_records(&mut visible, &self.sort);
        paginate(&visible, self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::product;
    use crate::search::{Choice, ProductFilter, SearchTerms};
    use crate::sorting::{ProductSortKey, SortDirection};

    fn state() -> ListState<ProductFilter, ProductSortKey> {
        ListState::new(
            ProductFilter::default(),
            SortState::ascending(ProductSortKey::Name),
            2,
        )
    }

    #[test]
    fn test_filter_and_sort_changes_reset_page() {
        let mut list = state();

        list.set_page(3);
        list.update_filter(|f| f.search = SearchTerms::parse("dell"));
        assert_eq!(list.page(), 1);

        list.set_page(3);
        list.toggle_sort(ProductSortKey::Available);
        assert_eq!(list.page(), 1);
        assert_eq!(list.sort().direction, SortDirection::Asc);

        list.set_page(2);
        list.set_page_size(5);
        assert_eq!(list.page(), 1);

        list.set_page(4);
        list.set_filter(ProductFilter {
            category: Choice::Only("IT".to_string()),
            ..Default::default()
        });
        assert_eq!(list.page(), 1);
        assert_eq!(list.filter().category, Choice::Only("IT".to_string()));

        list.set_page(4);
        list.set_sort(SortState::new(ProductSortKey::Price, SortDirection::Desc));
        assert_eq!(list.page(), 1);
        assert_eq!(list.sort().key, ProductSortKey::Price);

        list.set_page(0);
        assert_eq!(list.page(), 1);
    }

    #[test]
    fn test_run_filters_sorts_then_paginates() {
        let rows = vec![
            product("Dell Monitor", "IT", 4),
            product("Chair", "FR", 1),
            product("Acer Laptop", "IT", 2),
            product("Asus Router", "IT", 9),
        ];
        let mut list = state();
        list.update_filter(|f| f.category = Choice::Only("IT".to_string()));

        let first = list.run(&rows);
        assert_eq!(first.total, 3);
        assert_eq!(first.total_pages, 2);
        let names: Vec<_> = first.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Acer Laptop", "Asus Router"]);

        list.set_page(2);
        let second = list.run(&rows);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].name, "Dell Monitor");
    }

    #[test]
    fn test_run_is_idempotent() {
        let rows = vec![product("B", "IT", 1), product("A", "IT", 1)];
        let list = state();
        assert_eq!(list.run(&rows), list.run(&rows));
    }
}

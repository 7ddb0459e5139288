// =============================================================================
// SEARCH MODULE
// =============================================================================
// Client-side filter predicates shared by the list screens.
//
// LEARNING NOTES:
// - Every screen composes the same building blocks: a multi-term text
//   search, "all or exactly one value" choices, an inclusive date range.
// - All criteria of a screen combine with logical AND.
// - Missing optional fields never panic; they simply don't match.
// =============================================================================

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    Product, ProductSerial, Role, SerialStatus, Transaction, TransactionStatus, UserAccount,
    UserStatus,
};

// =============================================================================
// RECORD FILTER TRAIT
// =============================================================================

/// A predicate over one record type. Implemented by each screen's filter.
pub trait RecordFilter<T> {
    fn accepts(&self, item: &T) -> bool;
}

// =============================================================================
// MULTI-TERM SEARCH
// =============================================================================

/// Records expose the text blob the search box matches against.
pub trait Searchable {
    fn search_blob(&self) -> String;
}

/// Lowercased, whitespace-split search terms.
///
/// A record matches iff every term is a substring of its blob, so term order
/// does not matter. No terms means everything matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms {
    terms: Vec<String>,
}

impl SearchTerms {
    pub fn parse(input: &str) -> Self {
        let terms = input
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, blob: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let blob = blob.to_lowercase();
        self.terms.iter().all(|term| blob.contains(term.as_str()))
    }

    pub fn matches_record<T: Searchable>(&self, item: &T) -> bool {
        self.is_empty() || self.matches(&item.search_blob())
    }
}

fn join_fields(fields: &[&str]) -> String {
    fields
        .iter()
        .filter(|field| !field.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Searchable for Product {
    fn search_blob(&self) -> String {
        join_fields(&[&self.name, &self.p_id, &self.brand, &self.model, &self.category])
    }
}

impl Searchable for ProductSerial {
    fn search_blob(&self) -> String {
        join_fields(&[
            &self.serial_code,
            &self.product_name,
            &self.location_name,
            &self.notes,
        ])
    }
}

impl Searchable for Transaction {
    fn search_blob(&self) -> String {
        join_fields(&[
            &self.employee_name,
            &self.serial_code,
            &self.product_name,
            &self.note,
        ])
    }
}

impl Searchable for UserAccount {
    fn search_blob(&self) -> String {
        join_fields(&[
            &self.name,
            &self.nickname,
            &self.emp_code,
            &self.email,
            &self.tel,
            &self.department_name,
        ])
    }
}

// =============================================================================
// SINGLE-VALUE CHOICES
// =============================================================================

/// Either no constraint (`"all"`) or exactly one accepted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: PartialEq> Choice<T> {
    /// Parse a query value. Missing, empty and `"all"` mean no constraint;
    /// anything else goes through `parse`. Returns `None` if `parse` rejects.
    pub fn parse_with<F>(raw: Option<&str>, parse: F) -> Option<Self>
    where
        F: FnOnce(&str) -> Option<T>,
    {
        match raw.map(str::trim) {
            None | Some("") => Some(Choice::All),
            Some(value) if value.eq_ignore_ascii_case("all") => Some(Choice::All),
            Some(value) => parse(value).map(Choice::Only),
        }
    }

    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(expected) => expected == value,
        }
    }

    /// Like `accepts`, for fields that may be missing on the record.
    pub fn accepts_opt(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Choice::All, _) => true,
            (Choice::Only(expected), Some(value)) => expected == value,
            (Choice::Only(_), None) => false,
        }
    }
}

impl Choice<String> {
    pub fn parse_text(raw: Option<&str>) -> Self {
        Self::parse_with(raw, |value| Some(value.to_string())).unwrap_or_default()
    }
}

// =============================================================================
// DATE RANGE
// =============================================================================

/// Inclusive date range. Without `from` the filter is disabled; without `to`
/// it is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some()
    }

    /// Records without a date are excluded while the range is active.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(from) = self.from else {
            return true;
        };
        let Some(date) = date else {
            return false;
        };
        date >= from && self.to.map_or(true, |to| date <= to)
    }
}

// =============================================================================
// LOW-STOCK THRESHOLD
// =============================================================================

/// User-adjustable threshold for the low-stock view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowStockThreshold {
    value: u32,
}

impl LowStockThreshold {
    pub const PRESETS: [u32; 3] = [1, 3, 7];

    /// Falls back to the middle preset if `value` is zero.
    pub fn new(value: u32) -> Self {
        if value == 0 {
            Self { value: 3 }
        } else {
            Self { value }
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Select one of the presets. Other values are ignored.
    pub fn set_preset(&mut self, preset: u32) -> bool {
        if Self::PRESETS.contains(&preset) {
            self.value = preset;
            true
        } else {
            false
        }
    }

    /// Apply a free-form entry. Only finite integers >= 1 are accepted; on
    /// anything else the previous value is kept and `false` is returned.
    pub fn set_custom(&mut self, input: &str) -> bool {
        match parse_threshold(input) {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }

    pub fn includes(&self, available: i64) -> bool {
        available < i64::from(self.value)
    }
}

impl Default for LowStockThreshold {
    fn default() -> Self {
        Self::new(3)
    }
}

fn parse_threshold(input: &str) -> Option<u32> {
    let parsed: f64 = input.trim().parse().ok()?;
    if !parsed.is_finite() || parsed.fract() != 0.0 || parsed < 1.0 {
        return None;
    }
    if parsed > f64::from(u32::MAX) {
        return None;
    }
    Some(parsed as u32)
}

// =============================================================================
// PER-SCREEN FILTERS
// =============================================================================

/// Products screen: search plus category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: SearchTerms,
    pub category: Choice<String>,
}

impl RecordFilter<Product> for ProductFilter {
    fn accepts(&self, item: &Product) -> bool {
        self.category.accepts(&item.category) && self.search.matches_record(item)
    }
}

/// Serials screen: search, status, location and creation date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerialFilter {
    pub search: SearchTerms,
    pub status: Choice<SerialStatus>,
    pub location: Choice<Uuid>,
    pub dates: DateRange,
}

impl RecordFilter<ProductSerial> for SerialFilter {
    fn accepts(&self, item: &ProductSerial) -> bool {
        self.status.accepts(&item.status)
            && self.location.accepts_opt(item.location_id.as_ref())
            && self.dates.contains(item.filter_date())
            && self.search.matches_record(item)
    }
}

/// Transactions screen: search, status and borrow date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub search: SearchTerms,
    pub status: Choice<TransactionStatus>,
    pub dates: DateRange,
}

impl RecordFilter<Transaction> for TransactionFilter {
    fn accepts(&self, item: &Transaction) -> bool {
        self.status.accepts(&item.status)
            && self.dates.contains(item.filter_date())
            && self.search.matches_record(item)
    }
}

/// Users screen: search, role, status and department.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub search: SearchTerms,
    pub role: Choice<Role>,
    pub status: Choice<UserStatus>,
    pub department: Choice<String>,
}

impl RecordFilter<UserAccount> for UserFilter {
    fn accepts(&self, item: &UserAccount) -> bool {
        self.role.accepts(&item.role)
            && self.status.accepts(&item.status)
            && self.department.accepts(&item.department_id)
            && self.search.matches_record(item)
    }
}

/// Products whose available stock is below the threshold.
pub struct LowStockFilter(pub LowStockThreshold);

impl RecordFilter<Product> for LowStockFilter {
    fn accepts(&self, item: &Product) -> bool {
        self.0.includes(item.stock_available)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(name: &str, category: &str, available: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            p_id: String::new(),
            name: name.to_string(),
            category: category.to_string(),
            brand: String::new(),
            model: String::new(),
            price: 0.0,
            unit: "unit".to_string(),
            image_url: None,
            stock_total: available,
            stock_available: available,
        }
    }

    fn filter_products<'a>(products: &'a [Product], filter: &ProductFilter) -> Vec<&'a Product> {
        products.iter().filter(|p| filter.accepts(p)).collect()
    }

    #[test]
    fn test_search_matches_terms_in_any_order() {
        let products = vec![product("AIO Dell", "IT", 2), product("Chair", "FR", 4)];

        for query in ["aio dell", "dell aio", "  DELL   aio "] {
            let filter = ProductFilter {
                search: SearchTerms::parse(query),
                ..Default::default()
            };
            let found = filter_products(&products, &filter);
            assert_eq!(found.len(), 1, "query {:?}", query);
            assert_eq!(found[0].name, "AIO Dell");
        }
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let products = vec![product("AIO Dell", "IT", 2), product("Chair", "FR", 4)];
        let filter = ProductFilter {
            search: SearchTerms::parse("   "),
            ..Default::default()
        };
        assert_eq!(filter_products(&products, &filter).len(), 2);
    }

    #[test]
    fn test_search_and_category_combine_with_and() {
        let products = vec![
            product("Dell Monitor", "IT", 2),
            product("Dell Desk", "FR", 4),
        ];
        let filter = ProductFilter {
            search: SearchTerms::parse("dell"),
            category: Choice::Only("FR".to_string()),
        };
        let found = filter_products(&products, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Dell Desk");
    }

    #[test]
    fn test_search_matches_thai_text() {
        let products = vec![product("เก้าอี้สำนักงาน", "FR", 1)];
        let filter = ProductFilter {
            search: SearchTerms::parse("เก้าอี้"),
            ..Default::default()
        };
        assert_eq!(filter_products(&products, &filter).len(), 1);
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!(Choice::parse_text(None), Choice::All);
        assert_eq!(Choice::parse_text(Some("ALL")), Choice::All);
        assert_eq!(Choice::parse_text(Some("IT")), Choice::Only("IT".to_string()));
        assert_eq!(
            Choice::parse_with(Some("lost"), SerialStatus::parse),
            Some(Choice::Only(SerialStatus::Lost))
        );
        assert_eq!(Choice::parse_with(Some("melted"), SerialStatus::parse), None);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date");
        let range = DateRange::new(Some(day(10)), Some(day(12)));

        assert!(!range.contains(Some(day(9))));
        assert!(range.contains(Some(day(10))));
        assert!(range.contains(Some(day(12))));
        assert!(!range.contains(Some(day(13))));
        assert!(!range.contains(None));
    }

    #[test]
    fn test_date_range_without_from_is_disabled() {
        let range = DateRange::new(None, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert!(!range.is_active());
        assert!(range.contains(None));
        assert!(range.contains(NaiveDate::from_ymd_opt(2030, 1, 1)));
    }

    #[test]
    fn test_low_stock_threshold_rejects_invalid_custom_values() {
        let mut threshold = LowStockThreshold::default();
        assert!(threshold.set_preset(7));
        assert_eq!(threshold.value(), 7);

        for bad in ["0", "-2", "2.5", "abc", "", "inf", "NaN"] {
            assert!(!threshold.set_custom(bad), "accepted {:?}", bad);
            assert_eq!(threshold.value(), 7);
        }

        assert!(threshold.set_custom(" 12 "));
        assert_eq!(threshold.value(), 12);
        assert!(!threshold.set_preset(5));
        assert_eq!(threshold.value(), 12);
    }

    #[test]
    fn test_low_stock_filter_is_strictly_below() {
        let filter = LowStockFilter(LowStockThreshold::new(3));
        assert!(filter.accepts(&product("A", "IT", 2)));
        assert!(!filter.accepts(&product("B", "IT", 3)));
    }
}

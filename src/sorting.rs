// =============================================================================
// SORTING MODULE
// =============================================================================
// Column sort state and comparators for the list screens.
//
// LEARNING NOTES:
// - Names are mostly Thai, so we compare text with an ICU collator for the
//   "th" locale instead of comparing bytes.
// - Rust's `sort_by` is stable, but we still break ties explicitly by name
//   so the order never depends on the order rows arrived in.
// =============================================================================

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use serde::{Deserialize, Serialize};

use crate::models::{Product, ProductSerial, Transaction, UserAccount};

// =============================================================================
// SORT STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Active sort column and direction of a list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortState<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn ascending(key: K) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    /// Header click: the active column flips direction, a new column always
    /// starts ascending.
    pub fn toggle(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }
}

// =============================================================================
// COMPARATORS
// =============================================================================

thread_local! {
    // Collator construction loads CLDR tables, so build it once per thread.
    static THAI_COLLATOR: Option<Collator> =
        Collator::try_new(&locale!("th").into(), CollatorOptions::new()).ok();
}

/// Locale-aware comparison using Thai collation.
///
/// Falls back to code-point order if the collation data could not be loaded.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    THAI_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    })
}

/// Total order over numbers. NaN (e.g. a `numeric 'NaN'` price) sorts after
/// every real value, and all NaNs compare equal.
pub fn compare_number(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// The value a record exposes for one sortable column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortValue<'_> {
    fn compare(&self, other: &SortValue<'_>) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => compare_text(a, b),
            (SortValue::Number(a), SortValue::Number(b)) => compare_number(*a, *b),
            // Mixed kinds only happen if a column mapping is wrong; keep numbers first.
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Records that can be ordered by the columns of their screen.
pub trait Sortable<K> {
    fn sort_value(&self, key: K) -> SortValue<'_>;

    /// Secondary key used when the primary values are equal.
    fn tie_break_name(&self) -> &str;
}

/// Sort in place by the active column, breaking ties by name ascending
/// regardless of the primary direction.
pub fn sort_records<T, K>(items: &mut [T], state: &SortState<K>)
where
    T: Sortable<K>,
    K: Copy,
{
    items.sort_by(|a, b| {
        let primary = a.sort_value(state.key).compare(&b.sort_value(state.key));
        state
            .direction
            .apply(primary)
            .then_with(|| compare_text(a.tie_break_name(), b.tie_break_name()))
    });
}

// =============================================================================
// COLUMN KEYS PER SCREEN
// =============================================================================

macro_rules! column_keys {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn parse(raw: &str) -> Option<Self> {
                match raw.trim().to_lowercase().as_str() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

column_keys!(
    /// Sortable columns of the Products and inventory screens.
    ProductSortKey {
        Name => "name",
        Code => "p_id",
        Category => "category",
        Brand => "brand",
        Price => "price",
        Total => "stock_total",
        Available => "available",
    }
);

column_keys!(
    SerialSortKey {
        SerialCode => "serial_code",
        Product => "product_name",
        Status => "status",
        Location => "location",
        CreatedAt => "created_at",
    }
);

column_keys!(
    TransactionSortKey {
        Employee => "employee_name",
        Product => "product_name",
        Status => "status",
        BorrowDate => "borrow_date",
        ReturnDate => "return_date",
    }
);

column_keys!(
    UserSortKey {
        Name => "name",
        Email => "email",
        Department => "department",
        Role => "role",
        Status => "status",
    }
);

fn timestamp(at: Option<chrono::DateTime<chrono::Utc>>) -> SortValue<'static> {
    // Missing dates sort before every real date.
    SortValue::Number(at.map_or(f64::MIN, |at| at.timestamp_millis() as f64))
}

impl Sortable<ProductSortKey> for Product {
    fn sort_value(&self, key: ProductSortKey) -> SortValue<'_> {
        match key {
            ProductSortKey::Name => SortValue::Text(&self.name),
            ProductSortKey::Code => SortValue::Text(&self.p_id),
            ProductSortKey::Category => SortValue::Text(&self.category),
            ProductSortKey::Brand => SortValue::Text(&self.brand),
            ProductSortKey::Price => SortValue::Number(self.price),
            ProductSortKey::Total => SortValue::Number(self.stock_total as f64),
            ProductSortKey::Available => SortValue::Number(self.stock_available as f64),
        }
    }

    fn tie_break_name(&self) -> &str {
        &self.name
    }
}

impl Sortable<SerialSortKey> for ProductSerial {
    fn sort_value(&self, key: SerialSortKey) -> SortValue<'_> {
        match key {
            SerialSortKey::SerialCode => SortValue::Text(&self.serial_code),
            SerialSortKey::Product => SortValue::Text(&self.product_name),
            SerialSortKey::Status => SortValue::Text(self.status.as_str()),
            SerialSortKey::Location => SortValue::Text(&self.location_name),
            SerialSortKey::CreatedAt => timestamp(self.created_at),
        }
    }

    fn tie_break_name(&self) -> &str {
        &self.serial_code
    }
}

impl Sortable<TransactionSortKey> for Transaction {
    fn sort_value(&self, key: TransactionSortKey) -> SortValue<'_> {
        match key {
            TransactionSortKey::Employee => SortValue::Text(&self.employee_name),
            TransactionSortKey::Product => SortValue::Text(&self.product_name),
            TransactionSortKey::Status => SortValue::Text(self.status.as_str()),
            TransactionSortKey::BorrowDate => timestamp(self.borrow_date),
            TransactionSortKey::ReturnDate => timestamp(self.return_date),
        }
    }

    fn tie_break_name(&self) -> &str {
        &self.employee_name
    }
}

impl Sortable<UserSortKey> for UserAccount {
    fn sort_value(&self, key: UserSortKey) -> SortValue<'_> {
        match key {
            UserSortKey::Name => SortValue::Text(&self.name),
            UserSortKey::Email => SortValue::Text(&self.email),
            UserSortKey::Department => SortValue::Text(&self.department_name),
            UserSortKey::Role => SortValue::Text(self.role.as_str()),
            UserSortKey::Status => SortValue::Text(self.status.as_str()),
        }
    }

    fn tie_break_name(&self) -> &str {
        &self.name
    }
}

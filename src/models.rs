// =============================================================================
// MODELS MODULE
// =============================================================================
// Strict internal representations of the rows the backend hands us.
//
// LEARNING NOTES:
// - The backend stores statuses and roles as loose strings. We convert them
//   into enums once, at the boundary (see db.rs), so the rest of the code
//   can `match` exhaustively instead of comparing strings.
// - Serde derives give us the JSON shape for API responses.
// =============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Page, PageToken};

// =============================================================================
// USER ACCOUNTS
// =============================================================================

/// Display role of a user account.
///
/// This is a label only. Access control is enforced by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    /// Strict parse for filter parameters. Display code should use
    /// `identity::normalize_role` instead.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

impl UserStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "pending" => Some(UserStatus::Pending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }
}

/// An employee record as listed on the Users screen.
///
/// `id` may be empty for rows that have not been persisted yet, which is why
/// list rendering and dedupe never rely on it alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub tel: String,
    pub department_id: String,
    pub department_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub nickname: String,
    pub emp_code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user row plus the stable key the console renders it under.
#[derive(Debug, Clone, Serialize)]
pub struct UserListItem {
    pub list_key: String,
    #[serde(flatten)]
    pub user: UserAccount,
}

// =============================================================================
// MASTER DATA (departments, locations, categories)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasterKind {
    Department,
    Location,
    Category,
}

impl MasterKind {
    /// Parse the path segment used by the API (`departments`, `locations`,
    /// `categories`; singular forms are accepted too).
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.trim().to_lowercase().as_str() {
            "department" | "departments" => Some(MasterKind::Department),
            "location" | "locations" => Some(MasterKind::Location),
            "category" | "categories" => Some(MasterKind::Category),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MasterKind::Department => "department",
            MasterKind::Location => "location",
            MasterKind::Category => "category",
        }
    }
}

/// One row of a master-data table. `extra` carries the table's optional
/// second attribute (department code, location building, category prefix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// Request body for creating a master-data row.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMasterRecord {
    pub name: String,
    #[serde(default)]
    pub extra: Option<String>,
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// A product definition with its server-computed stock figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Human SKU, e.g. "IT-0001"
    pub p_id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub unit: String,
    pub image_url: Option<String>,
    pub stock_total: i64,
    pub stock_available: i64,
}

// =============================================================================
// SERIALIZED UNITS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialStatus {
    Ready,
    InUse,
    InRepair,
    Retired,
    Lost,
    Disposed,
    Inactive,
    Unavailable,
}

impl SerialStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ready" => Some(SerialStatus::Ready),
            "in_use" => Some(SerialStatus::InUse),
            "in_repair" => Some(SerialStatus::InRepair),
            "retired" => Some(SerialStatus::Retired),
            "lost" => Some(SerialStatus::Lost),
            "disposed" => Some(SerialStatus::Disposed),
            "inactive" => Some(SerialStatus::Inactive),
            "unavailable" => Some(SerialStatus::Unavailable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SerialStatus::Ready => "ready",
            SerialStatus::InUse => "in_use",
            SerialStatus::InRepair => "in_repair",
            SerialStatus::Retired => "retired",
            SerialStatus::Lost => "lost",
            SerialStatus::Disposed => "disposed",
            SerialStatus::Inactive => "inactive",
            SerialStatus::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerStatus {
    Pending,
    Completed,
}

impl StickerStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Some(StickerStatus::Pending),
            "completed" => Some(StickerStatus::Completed),
            _ => None,
        }
    }
}

/// One physical, trackable unit of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSerial {
    pub id: Uuid,
    pub serial_code: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub status: SerialStatus,
    pub sticker_status: StickerStatus,
    pub location_id: Option<Uuid>,
    pub location_name: String,
    pub image_url: Option<String>,
    pub sticker_image_url: Option<String>,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductSerial {
    /// Date used by the date-range filter on the Serials screen.
    pub fn filter_date(&self) -> Option<NaiveDate> {
        self.created_at.map(|at| at.date_naive())
    }
}

// =============================================================================
// BORROW / RETURN TRANSACTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Active,
    Completed,
    Rejected,
    PendingReturn,
}

impl TransactionStatus {
    /// Accepts the backend spelling ("PendingReturn") as well as snake case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace('_', "").as_str() {
            "pending" => Some(TransactionStatus::Pending),
            "active" => Some(TransactionStatus::Active),
            "completed" => Some(TransactionStatus::Completed),
            "rejected" => Some(TransactionStatus::Rejected),
            "pendingreturn" => Some(TransactionStatus::PendingReturn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Active => "Active",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Rejected => "Rejected",
            TransactionStatus::PendingReturn => "PendingReturn",
        }
    }
}

/// A borrow/return record linking an employee to a serial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub employee_id: String,
    pub employee_name: String,
    pub serial_id: Uuid,
    pub serial_code: String,
    pub product_name: String,
    pub status: TransactionStatus,
    pub borrow_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub note: String,
}

impl Transaction {
    /// The Transactions screen filters on the borrow date.
    pub fn filter_date(&self) -> Option<NaiveDate> {
        self.borrow_date.map(|at| at.date_naive())
    }
}

/// Request body for rejecting a borrow request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

// =============================================================================
// USER FORM
// =============================================================================

/// Whether a new account receives an email invite or an admin-set password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupMode {
    #[default]
    Invite,
    Password,
}

/// Which dialog the form is rendered in. Each mode validates differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Create,
    Edit,
    View,
}

/// Transient state of the create/edit user dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFormValues {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tel: String,
    #[serde(default)]
    pub department_id: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_status")]
    pub status: UserStatus,
    #[serde(default, rename = "setupMode", alias = "setup_mode")]
    pub setup_mode: SetupMode,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirmPassword", alias = "confirm_password")]
    pub confirm_password: String,
}

fn default_role() -> Role {
    Role::Employee
}

fn default_status() -> UserStatus {
    UserStatus::Active
}

impl Default for UserFormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            tel: String::new(),
            department_id: String::new(),
            role: default_role(),
            status: default_status(),
            setup_mode: SetupMode::default(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }
}

/// Request body for the password strength endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordProbe {
    pub password: String,
}

// =============================================================================
// API RESPONSE STRUCTURES
// =============================================================================

/// One page of a list screen, with the page-number controls precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub pages: Vec<PageToken>,
}

impl<T> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        let pages = page.tokens();
        Self {
            items: page.items,
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            total_pages: page.total_pages,
            pages,
        }
    }
}

/// Low-stock view: the threshold used and the products below it.
#[derive(Debug, Clone, Serialize)]
pub struct LowStockResponse {
    pub threshold: u32,
    pub items: Vec<Product>,
}

/// Simple health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Detailed readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: bool,
    pub redis: bool,
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional structured details (field errors for validation failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

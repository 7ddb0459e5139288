// =============================================================================
// BACKEND MODULE
// =============================================================================
// Typed access to the hosted backend: Postgres views for reads and stored
// procedures for every state change (stock arithmetic, safe deletes, borrow
// approval). The schema and its rules are owned by the backend; this module
// only calls it.
//
// LEARNING NOTES:
// - Rows arrive with nullable, stringly-typed columns. Each `*Row` struct
//   mirrors the wire shape and is converted into a strict model right here,
//   so handlers never see an `Option<String>` status.
// - Queries are built at runtime (`sqlx::query_as`), so compiling this crate
//   does not need a live database.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use asset_console::identity::{normalize_role, normalize_status};
use asset_console::models::{
    MasterKind, MasterRecord, NewMasterRecord, Product, ProductSerial, SerialStatus,
    StickerStatus, Transaction, TransactionStatus, UserAccount, UserFormValues, SetupMode,
};

// -----------------------------------------------------------------------------
// WIRE ROWS
// -----------------------------------------------------------------------------

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    p_id: Option<String>,
    name: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    price: Option<f64>,
    unit: Option<String>,
    image_url: Option<String>,
    stock_total: Option<i64>,
    stock_available: Option<i64>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            p_id: row.p_id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            brand: row.brand.unwrap_or_default(),
            model: row.model.unwrap_or_default(),
            price: row.price.unwrap_or_default(),
            unit: row.unit.unwrap_or_default(),
            image_url: row.image_url.filter(|url| !url.is_empty()),
            stock_total: row.stock_total.unwrap_or_default(),
            stock_available: row.stock_available.unwrap_or_default(),
        }
    }
}

#[derive(Debug, FromRow)]
struct SerialRow {
    id: Uuid,
    serial_code: Option<String>,
    product_id: Uuid,
    product_name: Option<String>,
    status: Option<String>,
    sticker_status: Option<String>,
    location_id: Option<Uuid>,
    location_name: Option<String>,
    image_url: Option<String>,
    sticker_image_url: Option<String>,
    notes: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<SerialRow> for ProductSerial {
    fn from(row: SerialRow) -> Self {
        let raw_status = row.status.unwrap_or_default();
        let status = SerialStatus::parse(&raw_status).unwrap_or_else(|| {
            tracing::warn!(serial_id = %row.id, status = %raw_status, "Unknown serial status");
            SerialStatus::Unavailable
        });
        let sticker_status = row
            .sticker_status
            .as_deref()
            .and_then(StickerStatus::parse)
            .unwrap_or(StickerStatus::Pending);

        ProductSerial {
            id: row.id,
            serial_code: row.serial_code.unwrap_or_default(),
            product_id: row.product_id,
            product_name: row.product_name.unwrap_or_default(),
            status,
            sticker_status,
            location_id: row.location_id,
            location_name: row.location_name.unwrap_or_default(),
            image_url: row.image_url.filter(|url| !url.is_empty()),
            sticker_image_url: row.sticker_image_url.filter(|url| !url.is_empty()),
            notes: row.notes.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    employee_id: Option<String>,
    employee_name: Option<String>,
    serial_id: Uuid,
    serial_code: Option<String>,
    product_name: Option<String>,
    status: Option<String>,
    borrow_date: Option<DateTime<Utc>>,
    return_date: Option<DateTime<Utc>>,
    note: Option<String>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        let raw_status = row.status.unwrap_or_default();
        let status = TransactionStatus::parse(&raw_status).unwrap_or_else(|| {
            tracing::warn!(transaction_id = %row.id, status = %raw_status, "Unknown transaction status");
            TransactionStatus::Pending
        });

        Transaction {
            id: row.id,
            employee_id: row.employee_id.unwrap_or_default(),
            employee_name: row.employee_name.unwrap_or_default(),
            serial_id: row.serial_id,
            serial_code: row.serial_code.unwrap_or_default(),
            product_name: row.product_name.unwrap_or_default(),
            status,
            borrow_date: row.borrow_date,
            return_date: row.return_date,
            note: row.note.unwrap_or_default(),
        }
    }
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    tel: Option<String>,
    department_id: Option<String>,
    department_name: Option<String>,
    role: Option<String>,
    status: Option<String>,
    nickname: Option<String>,
    emp_code: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<EmployeeRow> for UserAccount {
    fn from(row: EmployeeRow) -> Self {
        UserAccount {
            id: row.id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            tel: row.tel.unwrap_or_default(),
            department_id: row.department_id.unwrap_or_default(),
            department_name: row.department_name.unwrap_or_default(),
            role: normalize_role(row.role.as_deref()),
            status: normalize_status(row.status.as_deref()),
            nickname: row.nickname.unwrap_or_default(),
            emp_code: row.emp_code.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MasterRow {
    id: Uuid,
    name: String,
    extra: Option<String>,
}

impl From<MasterRow> for MasterRecord {
    fn from(row: MasterRow) -> Self {
        MasterRecord {
            id: row.id,
            name: row.name,
            extra: row.extra.filter(|extra| !extra.trim().is_empty()),
        }
    }
}

/// Table, secondary column and safe-delete procedure of a master-data kind.
fn master_table(kind: MasterKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        MasterKind::Department => ("departments", "code", "delete_department_safe"),
        MasterKind::Location => ("locations", "building", "delete_location_safe"),
        MasterKind::Category => ("categories", "code_prefix", "delete_category_safe"),
    }
}

// -----------------------------------------------------------------------------
// BACKEND WRAPPER
// -----------------------------------------------------------------------------
#[derive(Clone)]
pub struct Backend {
    pool: PgPool,
}

impl Backend {
    // -------------------------------------------------------------------------
    // CONNECTION
    // -------------------------------------------------------------------------
    /// Create a connection pool to the backend database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .idle_timeout(std::time::Duration::from_secs(300))
            .connect(database_url)
            .await
            .context("Failed to connect to the backend database")?;

        Ok(Self { pool })
    }

    // -------------------------------------------------------------------------
    // READ OPERATIONS
    // -------------------------------------------------------------------------

    /// Products with their server-computed stock figures.
    pub async fn list_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, p_id, name, category, brand, model,
                   price::float8 AS price, unit, image_url,
                   stock_total::int8 AS stock_total,
                   stock_available::int8 AS stock_available
            FROM products_with_stock
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn list_serials(&self) -> Result<Vec<ProductSerial>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SerialRow>(
            r#"
            SELECT s.id, s.serial_code, s.product_id, p.name AS product_name,
                   s.status, s.sticker_status, s.location_id,
                   l.name AS location_name, s.image_url, s.sticker_image_url,
                   s.notes, s.created_at
            FROM product_serials s
            JOIN products p ON p.id = s.product_id
            LEFT JOIN locations l ON l.id = s.location_id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductSerial::from).collect())
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT t.id, t.employee_id::text AS employee_id, e.name AS employee_name,
                   t.serial_id, s.serial_code, p.name AS product_name,
                   t.status, t.borrow_date, t.return_date, t.note
            FROM transactions t
            LEFT JOIN employees e ON e.id = t.employee_id
            JOIN product_serials s ON s.id = t.serial_id
            JOIN products p ON p.id = s.product_id
            ORDER BY t.borrow_date DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    pub async fn list_employees(&self) -> Result<Vec<UserAccount>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT e.id::text AS id, e.name, e.email, e.tel,
                   e.department_id::text AS department_id, d.name AS department_name,
                   e.role, e.status, e.nickname, e.emp_code,
                   e.created_at, e.updated_at
            FROM employees e
            LEFT JOIN departments d ON d.id = e.department_id
            ORDER BY e.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserAccount::from).collect())
    }

    /// Master-data rows of one kind, ordered by name.
    pub async fn list_master(&self, kind: MasterKind) -> Result<Vec<MasterRecord>, sqlx::Error> {
        let (table, extra, _) = master_table(kind);
        let sql = format!(
            "SELECT id, name, {extra}::text AS extra FROM {table} ORDER BY name ASC",
            extra = extra,
            table = table
        );
        let rows = sqlx::query_as::<_, MasterRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MasterRecord::from).collect())
    }

    // -------------------------------------------------------------------------
    // WRITE OPERATIONS
    // -------------------------------------------------------------------------

    pub async fn create_master(
        &self,
        kind: MasterKind,
        record: &NewMasterRecord,
    ) -> Result<MasterRecord, sqlx::Error> {
        let (table, extra, _) = master_table(kind);
        let sql = format!(
            "INSERT INTO {table} (name, {extra}) VALUES ($1, $2) \
             RETURNING id, name, {extra}::text AS extra",
            table = table,
            extra = extra
        );
        let row = sqlx::query_as::<_, MasterRow>(&sql)
            .bind(record.name.trim())
            .bind(record.extra.as_deref().map(str::trim))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    /// Delete through the backend's safe-delete procedure, which raises if
    /// the row is still referenced.
    pub async fn delete_master(&self, kind: MasterKind, id: Uuid) -> Result<(), sqlx::Error> {
        let (_, _, procedure) = master_table(kind);
        let sql = format!("SELECT {}($1)", procedure);
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    /// Create an employee. In password setup mode the initial password is
    /// passed along; in invite mode the backend sends an invitation email.
    pub async fn create_employee(&self, values: &UserFormValues) -> Result<String, sqlx::Error> {
        let password = match values.setup_mode {
            SetupMode::Password => Some(values.password.trim()),
            SetupMode::Invite => None,
        };

        let (id,): (String,) = sqlx::query_as(
            r#"
            SELECT create_employee(
                p_name := $1, p_email := $2, p_tel := $3,
                p_department_id := $4::uuid, p_role := $5, p_status := $6,
                p_password := $7
            )::text
            "#,
        )
        .bind(values.name.trim())
        .bind(values.email.trim().to_lowercase())
        .bind(values.tel.trim())
        .bind(values.department_id.trim())
        .bind(values.role.as_str())
        .bind(values.status.as_str())
        .bind(password)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Update an employee. Email is immutable after creation and not sent.
    pub async fn update_employee(&self, id: &str, values: &UserFormValues) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            SELECT update_employee(
                p_id := $1::uuid, p_name := $2, p_tel := $3,
                p_department_id := $4::uuid, p_role := $5, p_status := $6
            )
            "#,
        )
        .bind(id)
        .bind(values.name.trim())
        .bind(values.tel.trim())
        .bind(values.department_id.trim())
        .bind(values.role.as_str())
        .bind(values.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Approve a pending borrow request. The procedure moves the serial to
    /// in-use and the transaction to Active atomically.
    pub async fn approve_borrow(&self, transaction_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT approve_borrow_request($1)")
            .bind(transaction_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn reject_borrow(&self, transaction_id: Uuid, reason: &str) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT reject_borrow_request($1, $2)")
            .bind(transaction_id)
            .bind(reason.trim())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // HEALTH CHECK
    // -------------------------------------------------------------------------

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset_console::models::{Role, UserStatus};

    #[test]
    fn test_employee_row_is_normalized_at_the_boundary() {
        let row = EmployeeRow {
            id: None,
            name: Some("Somchai".to_string()),
            email: Some("somchai@example.co.th".to_string()),
            tel: None,
            department_id: None,
            department_name: None,
            role: Some("owner".to_string()),
            status: None,
            nickname: None,
            emp_code: None,
            created_at: None,
            updated_at: None,
        };
        let user = UserAccount::from(row);

        assert_eq!(user.id, "");
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn test_unknown_serial_status_becomes_unavailable() {
        let row = SerialRow {
            id: Uuid::new_v4(),
            serial_code: Some("SN-1".to_string()),
            product_id: Uuid::new_v4(),
            product_name: None,
            status: Some("melted".to_string()),
            sticker_status: Some("COMPLETED".to_string()),
            location_id: None,
            location_name: None,
            image_url: Some(String::new()),
            sticker_image_url: None,
            notes: None,
            created_at: None,
        };
        let serial = ProductSerial::from(row);

        assert_eq!(serial.status, SerialStatus::Unavailable);
        assert_eq!(serial.sticker_status, StickerStatus::Completed);
        assert_eq!(serial.image_url, None);
    }

    #[test]
    fn test_master_tables_use_safe_delete_procedures() {
        for kind in [MasterKind::Department, MasterKind::Location, MasterKind::Category] {
            let (_, _, procedure) = master_table(kind);
            assert!(procedure.starts_with("delete_"));
            assert!(procedure.ends_with("_safe"));
        }
    }
}

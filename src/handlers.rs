// =============================================================================
// HANDLERS MODULE
// =============================================================================
// HTTP request handlers for the asset console.
//
// LEARNING NOTES:
// - List handlers fetch the raw rows from the backend, then run the pure
//   list pipeline from the library: filter -> sort -> paginate.
// - Form handlers validate first (422 with a field map), then take the
//   submit lock so a double click can't create the same user twice.
// - State is shared via the State<T> extractor
// =============================================================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use asset_console::dedupe::dedupe_users_by_identity;
use asset_console::identity::user_list_key;
use asset_console::list_state::ListState;
use asset_console::models::*;
use asset_console::password::{score_password, PasswordStrength};
use asset_console::search::{
    Choice, DateRange, LowStockFilter, LowStockThreshold, ProductFilter, RecordFilter,
    SearchTerms, SerialFilter, TransactionFilter, UserFilter,
};
use asset_console::sorting::{
    sort_records, ProductSortKey, SerialSortKey, SortDirection, SortState, TransactionSortKey,
    UserSortKey,
};
use asset_console::validation::validate_user_form;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::AppState;

// =============================================================================
// HEALTH CHECK ENDPOINTS
// =============================================================================

/// Liveness probe
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "asset-console".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe: backend database and Redis must both answer.
///
/// GET /ready
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, StatusCode> {
    let db_healthy = state.db.health_check().await;

    let redis_healthy = redis::cmd("PING")
        .query_async::<_, String>(&mut state.redis.clone())
        .await
        .is_ok();

    let all_healthy = db_healthy && redis_healthy;
    let status = if all_healthy { "ready" } else { "not_ready" };

    let response = ReadinessResponse {
        status: status.to_string(),
        checks: ReadinessChecks {
            database: db_healthy,
            redis: redis_healthy,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// Parameters shared by every list endpoint.
///
/// # Example
/// GET /api/v1/products?search=dell%20aio&category=IT&sort=available&dir=desc&page=2
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,

    // Screen-specific filters; each is "all" (or absent) or one value
    pub category: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,

    // Inclusive date range, YYYY-MM-DD
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ListParams {
    fn search_terms(&self) -> SearchTerms {
        SearchTerms::parse(self.search.as_deref().unwrap_or_default())
    }

    fn dates(&self) -> AppResult<DateRange> {
        Ok(DateRange::new(
            parse_date("from", self.from.as_deref())?,
            parse_date("to", self.to.as_deref())?,
        ))
    }

    fn sort_state<K>(&self, parse: fn(&str) -> Option<K>, default: K) -> AppResult<SortState<K>>
    where
        K: Copy + PartialEq,
    {
        let key = match self.sort.as_deref().map(str::trim) {
            None | Some("") => default,
            Some(raw) => parse(raw).ok_or_else(|| invalid("sort", raw))?,
        };
        let direction = match self.dir.as_deref().map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(raw) => SortDirection::parse(raw).ok_or_else(|| invalid("dir", raw))?,
        };
        Ok(SortState::new(key, direction))
    }

    /// Build the list state for a screen. The requested page is applied
    /// last, after filter and sort have been set.
    fn list_state<F, K>(
        &self,
        filter: F,
        sort: SortState<K>,
        default_page_size: usize,
    ) -> ListState<F, K>
    where
        K: Copy + PartialEq,
    {
        let page_size = self.page_size.unwrap_or(default_page_size).clamp(1, 100);
        let mut state = ListState::new(filter, sort, page_size);
        state.set_page(self.page.unwrap_or(1));
        state
    }
}

fn invalid(param: &str, raw: &str) -> AppError {
    AppError::BadRequest(format!("Unsupported value for '{}': {}", param, raw))
}

fn parse_date(param: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(param, value)),
    }
}

fn choice<T: PartialEq>(
    param: &str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> AppResult<Choice<T>> {
    Choice::parse_with(raw, parse).ok_or_else(|| invalid(param, raw.unwrap_or_default()))
}

fn product_filter(params: &ListParams) -> ProductFilter {
    ProductFilter {
        search: params.search_terms(),
        category: Choice::parse_text(params.category.as_deref()),
    }
}

fn serial_filter(params: &ListParams) -> AppResult<SerialFilter> {
    Ok(SerialFilter {
        search: params.search_terms(),
        status: choice("status", params.status.as_deref(), SerialStatus::parse)?,
        location: choice("location", params.location.as_deref(), |raw| {
            Uuid::parse_str(raw).ok()
        })?,
        dates: params.dates()?,
    })
}

fn transaction_filter(params: &ListParams) -> AppResult<TransactionFilter> {
    Ok(TransactionFilter {
        search: params.search_terms(),
        status: choice("status", params.status.as_deref(), TransactionStatus::parse)?,
        dates: params.dates()?,
    })
}

fn user_filter(params: &ListParams) -> AppResult<UserFilter> {
    Ok(UserFilter {
        search: params.search_terms(),
        role: choice("role", params.role.as_deref(), Role::parse)?,
        status: choice("status", params.status.as_deref(), UserStatus::parse)?,
        department: Choice::parse_text(params.department.as_deref()),
    })
}

/// Rows matching `filter`, for the row-count histogram.
fn matching<T, F: RecordFilter<T>>(rows: &[T], filter: &F) -> usize {
    rows.iter().filter(|row| filter.accepts(row)).count()
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// GET /api/v1/products
///
/// # Query Parameters
/// - `search`: space separated terms, all must match (any order)
/// - `category`: category name or `all`
/// - `sort`: name | p_id | category | brand | price | stock_total | available
/// - `dir`: asc | desc
/// - `page`, `page_size`
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse<Product>>> {
    let start = Instant::now();

    let sort = params.sort_state(ProductSortKey::parse, ProductSortKey::Name)?;
    let list = params.list_state(product_filter(&params), sort, state.config.default_page_size);

    let products = state.db.list_products().await?;
    metrics::record_db_query("list", start.elapsed().as_secs_f64());

    metrics::record_list_rows("products", matching(&products, list.filter()));
    let page = list.run(&products);

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/products", 200, duration);

    Ok(Json(page.into()))
}

/// Products whose available stock is below the threshold, lowest first.
///
/// GET /api/v1/products/low-stock?threshold=5
///
/// An invalid `threshold` is ignored and the configured default is used.
#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    pub threshold: Option<String>,
}

pub async fn low_stock_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LowStockParams>,
) -> AppResult<Json<LowStockResponse>> {
    let start = Instant::now();

    let mut threshold = LowStockThreshold::new(state.config.low_stock_threshold);
    if let Some(raw) = params.threshold.as_deref() {
        if !threshold.set_custom(raw) {
            tracing::debug!(threshold = %raw, "Ignoring invalid low-stock threshold");
        }
    }

    let products = state.db.list_products().await?;
    metrics::record_db_query("list", start.elapsed().as_secs_f64());

    let filter = LowStockFilter(threshold);
    let mut low: Vec<Product> = products
        .into_iter()
        .filter(|product| filter.accepts(product))
        .collect();
    sort_records(&mut low, &SortState::ascending(ProductSortKey::Available));

    metrics::set_low_stock_count(low.len());
    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/products/low-stock", 200, duration);

    Ok(Json(LowStockResponse {
        threshold: threshold.value(),
        items: low,
    }))
}

// =============================================================================
// SERIALS
// =============================================================================

/// GET /api/v1/serials
///
/// Filters: `search`, `status`, `location` (uuid), `from`/`to` (created date)
pub async fn list_serials(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse<ProductSerial>>> {
    let start = Instant::now();

    let sort = params.sort_state(SerialSortKey::parse, SerialSortKey::SerialCode)?;
    let list = params.list_state(serial_filter(&params)?, sort, state.config.default_page_size);

    let serials = state.db.list_serials().await?;
    metrics::record_db_query("list", start.elapsed().as_secs_f64());

    metrics::record_list_rows("serials", matching(&serials, list.filter()));
    let page = list.run(&serials);

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/serials", 200, duration);

    Ok(Json(page.into()))
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// GET /api/v1/transactions
///
/// Filters: `search`, `status`, `from`/`to` (borrow date)
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse<Transaction>>> {
    let start = Instant::now();

    let sort = params.sort_state(TransactionSortKey::parse, TransactionSortKey::BorrowDate)?;
    let list = params.list_state(
        transaction_filter(&params)?,
        sort,
        state.config.default_page_size,
    );

    let transactions = state.db.list_transactions().await?;
    metrics::record_db_query("list", start.elapsed().as_secs_f64());

    metrics::record_list_rows("transactions", matching(&transactions, list.filter()));
    let page = list.run(&transactions);

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/transactions", 200, duration);

    Ok(Json(page.into()))
}

/// Approve a pending borrow request.
///
/// POST /api/v1/transactions/:id/approve
pub async fn approve_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let start = Instant::now();

    tracing::info!(transaction_id = %id, "Approving borrow request");
    state.db.approve_borrow(id).await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_db_query("procedure", duration);
    metrics::record_http_request("POST", "/api/v1/transactions/:id/approve", 200, duration);

    Ok(Json(serde_json::json!({ "status": "approved", "id": id })))
}

/// Reject a pending borrow request.
///
/// POST /api/v1/transactions/:id/reject
///
/// # Request Body
/// ```json
/// { "reason": "Unit is reserved for the audit" }
/// ```
pub async fn reject_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectRequest>>,
) -> AppResult<Json<serde_json::Value>> {
    let start = Instant::now();
    let request = body.map(|Json(request)| request).unwrap_or_default();

    tracing::info!(transaction_id = %id, reason = %request.reason, "Rejecting borrow request");
    state.db.reject_borrow(id, &request.reason).await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_db_query("procedure", duration);
    metrics::record_http_request("POST", "/api/v1/transactions/:id/reject", 200, duration);

    Ok(Json(serde_json::json!({ "status": "rejected", "id": id })))
}

// =============================================================================
// USERS
// =============================================================================

/// GET /api/v1/users
///
/// Rows are deduplicated by identity before filtering, and each carries the
/// stable `list_key` the console renders it under.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse<UserListItem>>> {
    let start = Instant::now();

    let sort = params.sort_state(UserSortKey::parse, UserSortKey::Name)?;
    let list = params.list_state(user_filter(&params)?, sort, state.config.default_page_size);

    let fetched = state.db.list_employees().await?;
    metrics::record_db_query("list", start.elapsed().as_secs_f64());

    let fetched_count = fetched.len();
    let users = dedupe_users_by_identity(fetched);
    if users.len() != fetched_count {
        tracing::warn!(
            fetched = fetched_count,
            unique = users.len(),
            "Duplicate user rows collapsed"
        );
    }

    metrics::record_list_rows("users", matching(&users, list.filter()));
    let page = list.run(&users);

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/users", 200, duration);

    let pages = page.tokens();
    let items = page
        .items
        .into_iter()
        .map(|user| UserListItem {
            list_key: user_list_key(&user),
            user,
        })
        .collect();

    Ok(Json(ListResponse {
        items,
        page: page.page,
        page_size: page.page_size,
        total: page.total,
        total_pages: page.total_pages,
        pages,
    }))
}

/// Submission key of a create: the same email can't be in flight twice.
fn create_key(values: &UserFormValues) -> String {
    format!("create:{}", values.email.trim().to_lowercase())
}

fn edit_key(id: &str) -> String {
    format!("edit:{}", id.trim())
}

/// Create a user.
///
/// POST /api/v1/users
///
/// # Response
/// - 201 Created: `{ "id": "..." }`
/// - 422 Unprocessable Entity: field -> message map in `details`
/// - 409 Conflict: the same user is already being submitted, or the email is taken
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(values): Json<UserFormValues>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let start = Instant::now();

    let errors = validate_user_form(&values, FormMode::Create);
    if !errors.is_empty() {
        metrics::record_submission("user_create", "invalid");
        return Err(AppError::Validation(errors));
    }

    let Some(_guard) = state.user_form_locks.guard(create_key(&values)) else {
        metrics::record_submission("user_create", "duplicate");
        return Err(AppError::SubmissionInProgress);
    };

    tracing::info!(
        email = %values.email.trim().to_lowercase(),
        setup_mode = ?values.setup_mode,
        "Creating user"
    );

    let id = match state.db.create_employee(&values).await {
        Ok(id) => id,
        Err(e) => {
            metrics::record_submission("user_create", "failed");
            return Err(e.into());
        }
    };

    metrics::record_submission("user_create", "accepted");
    let duration = start.elapsed().as_secs_f64();
    metrics::record_db_query("procedure", duration);
    metrics::record_http_request("POST", "/api/v1/users", 201, duration);

    tracing::info!(user_id = %id, "User created");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Edit a user. Email is immutable and ignored here.
///
/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(values): Json<UserFormValues>,
) -> AppResult<Json<serde_json::Value>> {
    let start = Instant::now();

    let id = id.trim().to_string();
    if id.is_empty() {
        return Err(AppError::BadRequest("User id is required".to_string()));
    }

    let errors = validate_user_form(&values, FormMode::Edit);
    if !errors.is_empty() {
        metrics::record_submission("user_edit", "invalid");
        return Err(AppError::Validation(errors));
    }

    let Some(_guard) = state.user_form_locks.guard(edit_key(&id)) else {
        metrics::record_submission("user_edit", "duplicate");
        return Err(AppError::SubmissionInProgress);
    };

    if let Err(e) = state.db.update_employee(&id, &values).await {
        metrics::record_submission("user_edit", "failed");
        return Err(e.into());
    }

    metrics::record_submission("user_edit", "accepted");
    let duration = start.elapsed().as_secs_f64();
    metrics::record_db_query("procedure", duration);
    metrics::record_http_request("PUT", "/api/v1/users/:id", 200, duration);

    tracing::info!(user_id = %id, "User updated");
    Ok(Json(serde_json::json!({ "status": "updated", "id": id })))
}

/// Advisory strength meter for the password field. Never blocks submission.
///
/// POST /api/v1/users/password-strength
pub async fn password_strength(Json(probe): Json<PasswordProbe>) -> Json<PasswordStrength> {
    Json(score_password(&probe.password))
}

// =============================================================================
// MASTER DATA
// =============================================================================

fn master_kind(segment: &str) -> AppResult<MasterKind> {
    MasterKind::from_segment(segment)
        .ok_or_else(|| AppError::NotFound(format!("Unknown master data: {}", segment)))
}

fn master_cache_key(kind: MasterKind) -> String {
    format!("console:master:{}", kind.as_str())
}

async fn cached_master(state: &AppState, kind: MasterKind) -> Option<Vec<MasterRecord>> {
    let start = Instant::now();
    let cached: Option<String> = redis::cmd("GET")
        .arg(master_cache_key(kind))
        .query_async(&mut state.redis.clone())
        .await
        .ok()
        .flatten();
    metrics::record_redis_operation("get", start.elapsed().as_secs_f64());

    cached.and_then(|json| serde_json::from_str(&json).ok())
}

async fn store_master(state: &AppState, kind: MasterKind, records: &[MasterRecord]) {
    let Ok(json) = serde_json::to_string(records) else {
        return;
    };
    let start = Instant::now();
    let result: Result<(), _> = redis::cmd("SETEX")
        .arg(master_cache_key(kind))
        .arg(state.config.master_data_cache_ttl_secs)
        .arg(json)
        .query_async(&mut state.redis.clone())
        .await;
    metrics::record_redis_operation("set", start.elapsed().as_secs_f64());

    if let Err(e) = result {
        tracing::warn!(kind = kind.as_str(), error = %e, "Failed to cache master data");
    }
}

async fn invalidate_master(state: &AppState, kind: MasterKind) {
    let start = Instant::now();
    let result: Result<(), _> = redis::cmd("DEL")
        .arg(master_cache_key(kind))
        .query_async(&mut state.redis.clone())
        .await;
    metrics::record_redis_operation("delete", start.elapsed().as_secs_f64());

    if let Err(e) = result {
        tracing::warn!(kind = kind.as_str(), error = %e, "Failed to invalidate master data cache");
    }
}

/// GET /api/v1/master/:kind  (departments | locations | categories)
pub async fn list_master(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
) -> AppResult<Json<Vec<MasterRecord>>> {
    let start = Instant::now();
    let kind = master_kind(&segment)?;

    if let Some(records) = cached_master(&state, kind).await {
        let duration = start.elapsed().as_secs_f64();
        metrics::record_http_request("GET", "/api/v1/master/:kind", 200, duration);
        return Ok(Json(records));
    }

    let records = state.db.list_master(kind).await?;
    metrics::record_db_query("list", start.elapsed().as_secs_f64());
    store_master(&state, kind, &records).await;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/master/:kind", 200, duration);

    Ok(Json(records))
}

/// POST /api/v1/master/:kind
///
/// # Request Body
/// ```json
/// { "name": "Warehouse B", "extra": "Building 2" }
/// ```
pub async fn create_master(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
    Json(record): Json<NewMasterRecord>,
) -> AppResult<(StatusCode, Json<MasterRecord>)> {
    let start = Instant::now();
    let kind = master_kind(&segment)?;

    if record.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let created = state.db.create_master(kind, &record).await?;
    invalidate_master(&state, kind).await;

    tracing::info!(kind = kind.as_str(), id = %created.id, "Master data created");

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("POST", "/api/v1/master/:kind", 201, duration);

    Ok((StatusCode::CREATED, Json(created)))
}

/// Safe delete: the backend refuses if the row is still referenced, and that
/// refusal is returned to the admin verbatim.
///
/// DELETE /api/v1/master/:kind/:id
pub async fn delete_master(
    State(state): State<Arc<AppState>>,
    Path((segment, id)): Path<(String, Uuid)>,
) -> AppResult<StatusCode> {
    let start = Instant::now();
    let kind = master_kind(&segment)?;

    state.db.delete_master(kind, id).await?;
    invalidate_master(&state, kind).await;

    tracing::info!(kind = kind.as_str(), id = %id, "Master data deleted");

    let duration = start.elapsed().as_secs_f64();
    metrics::record_db_query("procedure", duration);
    metrics::record_http_request("DELETE", "/api/v1/master/:kind/:id", 204, duration);

    Ok(StatusCode::NO_CONTENT)
}

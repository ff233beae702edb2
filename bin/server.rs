// Brokerage Back-Office - Admin API Server
// JSON listing/search/edit surface generated from the record definitions
// and the admin registry.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use brokerage_backoffice::{
    accounts_for_rep, delete_account_holder, delete_general_account, delete_rep_code,
    get_account_holder, get_general_account, get_rep_code, holders_for_account,
    insert_account_holder, insert_general_account, insert_rep_code, list_account_holders,
    list_general_accounts, search_rep_codes, setup_database, update_account_holder,
    update_general_account, update_rep_code, AccountHolder, AdminSite, Address, GeneralAccount,
    Model, RepCategory, RepCode, SaveError, Status, ValidationError,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    site: Arc<AdminSite>,
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

#[derive(Serialize)]
struct FieldError {
    field: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    field_errors: Vec<FieldError>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        success: false,
        error: message.into(),
        field_errors: Vec::new(),
    };
    (status, Json(body)).into_response()
}

fn validation_response(errors: Vec<ValidationError>) -> Response {
    let body = ErrorResponse {
        success: false,
        error: "validation failed".to_string(),
        field_errors: errors
            .into_iter()
            .map(|e| FieldError {
                field: e.field,
                message: e.message,
            })
            .collect(),
    };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

/// Map write-time failures onto the API status codes: 422 for validation
/// and broken references, 409 for uniqueness, 500 for storage.
fn save_error_response(e: SaveError) -> Response {
    match e {
        SaveError::Invalid(errors) => validation_response(errors),
        SaveError::Duplicate { field } => error_response(
            StatusCode::CONFLICT,
            format!("duplicate value for unique field '{}'", field),
        ),
        SaveError::MissingReference { field } => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("'{}' does not reference an existing record", field),
        ),
        SaveError::Storage(err) => {
            eprintln!("Storage error: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage error")
        }
    }
}

fn storage_response(err: anyhow::Error) -> Response {
    eprintln!("Storage error: {}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage error")
}

#[derive(Deserialize)]
struct ListParams {
    q: Option<String>,
}

// ============================================================================
// Rep code payloads and handlers
// ============================================================================

#[derive(Deserialize)]
struct RepCodePayload {
    rep_number: String,
    rep_category: String,
    name: String,
    email_1: String,
    #[serde(default)]
    email_2: String,
    status: String,
    country: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    zip_code: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone_number: String,
    sharing_agreement: Option<f64>,
}

impl RepCodePayload {
    fn address(&self) -> Address {
        Address {
            country: self.country.clone(),
            state: self.state.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            address: self.address.clone(),
            phone_number: self.phone_number.clone(),
        }
    }

    /// Enum tags are checked before the record is built so a bad tag is a
    /// field-attributed 422, same as any other validation failure.
    fn parse_enums(&self) -> Result<(RepCategory, Status), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let category = RepCategory::parse(&self.rep_category);
        if category.is_none() {
            errors.push(ValidationError::new(
                "rep_category",
                format!("'{}' is not a valid category", self.rep_category),
            ));
        }
        let status = Status::parse(&self.status);
        if status.is_none() {
            errors.push(ValidationError::new(
                "status",
                format!("'{}' is not a valid status", self.status),
            ));
        }
        match (category, status) {
            (Some(c), Some(s)) => Ok((c, s)),
            _ => Err(errors),
        }
    }
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/rep-codes?q= - Configured list view: curated columns, search
/// over rep_number/name, ordered by rep_number ascending.
async fn list_rep_codes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    let conn = state.db.lock().unwrap();
    let admin = state
        .site
        .admin_for(Model::RepCode)
        .expect("RepCode is always registered");

    match search_rep_codes(&conn, params.q.as_deref()) {
        Ok(reps) => {
            let rows: Vec<_> = reps.iter().map(|r| admin.rep_row(r)).collect();
            (StatusCode::OK, Json(ApiResponse::ok(rows))).into_response()
        }
        Err(e) => storage_response(e),
    }
}

/// POST /api/rep-codes - Create a rep code
async fn create_rep_code(
    State(state): State<AppState>,
    Json(payload): Json<RepCodePayload>,
) -> Response {
    let (category, status) = match payload.parse_enums() {
        Ok(pair) => pair,
        Err(errors) => return validation_response(errors),
    };

    let mut rep = RepCode::new(
        payload.rep_number.clone(),
        category,
        payload.name.clone(),
        payload.email_1.clone(),
        status,
        payload.address(),
    );
    rep.email_2 = payload.email_2.clone();
    if let Some(sharing) = payload.sharing_agreement {
        rep.sharing_agreement = sharing;
    }

    let conn = state.db.lock().unwrap();
    match insert_rep_code(&conn, &rep) {
        Ok(()) => (StatusCode::CREATED, Json(ApiResponse::ok(rep))).into_response(),
        Err(e) => save_error_response(e),
    }
}

/// GET /api/rep-codes/:id
async fn get_rep_code_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let conn = state.db.lock().unwrap();
    match get_rep_code(&conn, &id) {
        Ok(Some(rep)) => (StatusCode::OK, Json(ApiResponse::ok(rep))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "rep code not found"),
        Err(e) => storage_response(e),
    }
}

/// PUT /api/rep-codes/:id
async fn update_rep_code_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RepCodePayload>,
) -> Response {
    let (category, status) = match payload.parse_enums() {
        Ok(pair) => pair,
        Err(errors) => return validation_response(errors),
    };

    let conn = state.db.lock().unwrap();
    let mut rep = match get_rep_code(&conn, &id) {
        Ok(Some(rep)) => rep,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "rep code not found"),
        Err(e) => return storage_response(e),
    };

    rep.rep_number = payload.rep_number.clone();
    rep.rep_category = category;
    rep.name = payload.name.clone();
    rep.email_1 = payload.email_1.clone();
    rep.email_2 = payload.email_2.clone();
    rep.status = status;
    rep.address = payload.address();
    if let Some(sharing) = payload.sharing_agreement {
        rep.sharing_agreement = sharing;
    }

    match update_rep_code(&conn, &mut rep) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(rep))).into_response(),
        Err(e) => save_error_response(e),
    }
}

/// DELETE /api/rep-codes/:id - Accounts booked under the rep survive with
/// their reference cleared.
async fn delete_rep_code_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let conn = state.db.lock().unwrap();
    match delete_rep_code(&conn, &id) {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(true))).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "rep code not found"),
        Err(e) => storage_response(e),
    }
}

/// GET /api/rep-codes/:id/accounts - Accounts booked under a rep
async fn rep_accounts_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let conn = state.db.lock().unwrap();
    match accounts_for_rep(&conn, &id) {
        Ok(accounts) => (StatusCode::OK, Json(ApiResponse::ok(accounts))).into_response(),
        Err(e) => storage_response(e),
    }
}

// ============================================================================
// General account payloads and handlers
// ============================================================================

#[derive(Deserialize)]
struct GeneralAccountPayload {
    account_number: String,
    account_name: String,
    #[serde(default)]
    rep_id: Option<String>,
    status: String,
    #[serde(default)]
    open_date: Option<NaiveDate>,
    #[serde(default)]
    close_date: Option<NaiveDate>,
    account_holders: Option<u8>,
    #[serde(default)]
    is_cash: bool,
    #[serde(default)]
    is_margin: bool,
    option_level: Option<u8>,
    country: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    zip_code: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone_number: String,
}

impl GeneralAccountPayload {
    fn address(&self) -> Address {
        Address {
            country: self.country.clone(),
            state: self.state.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            address: self.address.clone(),
            phone_number: self.phone_number.clone(),
        }
    }

    fn parse_status(&self) -> Result<Status, Vec<ValidationError>> {
        Status::parse(&self.status).ok_or_else(|| {
            vec![ValidationError::new(
                "status",
                format!("'{}' is not a valid status", self.status),
            )]
        })
    }

    fn apply(&self, acct: &mut GeneralAccount, status: Status) {
        acct.account_number = self.account_number.clone();
        acct.account_name = self.account_name.clone();
        acct.rep_id = self.rep_id.clone();
        acct.status = status;
        acct.open_date = self.open_date;
        acct.close_date = self.close_date;
        if let Some(holders) = self.account_holders {
            acct.account_holders = holders;
        }
        acct.is_cash = self.is_cash;
        acct.is_margin = self.is_margin;
        if let Some(level) = self.option_level {
            acct.option_level = level;
        }
        acct.address = self.address();
    }
}

/// GET /api/general-accounts - Default list view: all scalar columns
async fn list_accounts_handler(State(state): State<AppState>) -> Response {
    let conn = state.db.lock().unwrap();
    let admin = state
        .site
        .admin_for(Model::GeneralAccount)
        .expect("GeneralAccount is always registered");

    match list_general_accounts(&conn) {
        Ok(accounts) => {
            let rows: Vec<_> = accounts.iter().map(|a| admin.account_row(a)).collect();
            (StatusCode::OK, Json(ApiResponse::ok(rows))).into_response()
        }
        Err(e) => storage_response(e),
    }
}

/// POST /api/general-accounts
async fn create_account_handler(
    State(state): State<AppState>,
    Json(payload): Json<GeneralAccountPayload>,
) -> Response {
    let status = match payload.parse_status() {
        Ok(s) => s,
        Err(errors) => return validation_response(errors),
    };

    let mut acct = GeneralAccount::new(
        payload.account_number.clone(),
        payload.account_name.clone(),
        status,
        payload.address(),
    );
    payload.apply(&mut acct, status);

    let conn = state.db.lock().unwrap();
    match insert_general_account(&conn, &acct) {
        Ok(()) => (StatusCode::CREATED, Json(ApiResponse::ok(acct))).into_response(),
        Err(e) => save_error_response(e),
    }
}

/// GET /api/general-accounts/:id
async fn get_account_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let conn = state.db.lock().unwrap();
    match get_general_account(&conn, &id) {
        Ok(Some(acct)) => (StatusCode::OK, Json(ApiResponse::ok(acct))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "general account not found"),
        Err(e) => storage_response(e),
    }
}

/// PUT /api/general-accounts/:id
async fn update_account_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<GeneralAccountPayload>,
) -> Response {
    let status = match payload.parse_status() {
        Ok(s) => s,
        Err(errors) => return validation_response(errors),
    };

    let conn = state.db.lock().unwrap();
    let mut acct = match get_general_account(&conn, &id) {
        Ok(Some(acct)) => acct,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "general account not found"),
        Err(e) => return storage_response(e),
    };

    payload.apply(&mut acct, status);

    match update_general_account(&conn, &mut acct) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(acct))).into_response(),
        Err(e) => save_error_response(e),
    }
}

/// DELETE /api/general-accounts/:id - Holders cascade with the account.
async fn delete_account_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let conn = state.db.lock().unwrap();
    match delete_general_account(&conn, &id) {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(true))).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "general account not found"),
        Err(e) => storage_response(e),
    }
}

/// GET /api/general-accounts/:id/holders
async fn account_holders_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let conn = state.db.lock().unwrap();
    match holders_for_account(&conn, &id) {
        Ok(holders) => (StatusCode::OK, Json(ApiResponse::ok(holders))).into_response(),
        Err(e) => storage_response(e),
    }
}

// ============================================================================
// Account holder payloads and handlers
// ============================================================================

#[derive(Deserialize)]
struct AccountHolderPayload {
    name: String,
    account_id: String,
}

/// GET /api/account-holders - Default list view
async fn list_holders_handler(State(state): State<AppState>) -> Response {
    let conn = state.db.lock().unwrap();
    let admin = state
        .site
        .admin_for(Model::AccountHolder)
        .expect("AccountHolder is always registered");

    match list_account_holders(&conn) {
        Ok(holders) => {
            let rows: Vec<_> = holders.iter().map(|h| admin.holder_row(h)).collect();
            (StatusCode::OK, Json(ApiResponse::ok(rows))).into_response()
        }
        Err(e) => storage_response(e),
    }
}

/// POST /api/account-holders
async fn create_holder_handler(
    State(state): State<AppState>,
    Json(payload): Json<AccountHolderPayload>,
) -> Response {
    let holder = AccountHolder::new(payload.name, payload.account_id);

    let conn = state.db.lock().unwrap();
    match insert_account_holder(&conn, &holder) {
        Ok(()) => (StatusCode::CREATED, Json(ApiResponse::ok(holder))).into_response(),
        Err(e) => save_error_response(e),
    }
}

/// GET /api/account-holders/:id
async fn get_holder_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let conn = state.db.lock().unwrap();
    match get_account_holder(&conn, &id) {
        Ok(Some(holder)) => (StatusCode::OK, Json(ApiResponse::ok(holder))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "account holder not found"),
        Err(e) => storage_response(e),
    }
}

/// PUT /api/account-holders/:id
async fn update_holder_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AccountHolderPayload>,
) -> Response {
    let conn = state.db.lock().unwrap();
    let mut holder = match get_account_holder(&conn, &id) {
        Ok(Some(holder)) => holder,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "account holder not found"),
        Err(e) => return storage_response(e),
    };

    holder.name = payload.name;
    holder.account_id = payload.account_id;

    match update_account_holder(&conn, &mut holder) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(holder))).into_response(),
        Err(e) => save_error_response(e),
    }
}

/// DELETE /api/account-holders/:id
async fn delete_holder_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let conn = state.db.lock().unwrap();
    match delete_account_holder(&conn, &id) {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(true))).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "account holder not found"),
        Err(e) => storage_response(e),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("Brokerage Back-Office - Admin API Server");

    let db_path = std::env::var("BACKOFFICE_DB").unwrap_or_else(|_| "backoffice.db".to_string());
    let conn = Connection::open(&db_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to set up database schema");
    println!("✓ Database ready: {}", db_path);

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        site: Arc::new(AdminSite::default_registrations()),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/rep-codes", get(list_rep_codes).post(create_rep_code))
        .route(
            "/rep-codes/:id",
            get(get_rep_code_handler)
                .put(update_rep_code_handler)
                .delete(delete_rep_code_handler),
        )
        .route("/rep-codes/:id/accounts", get(rep_accounts_handler))
        .route(
            "/general-accounts",
            get(list_accounts_handler).post(create_account_handler),
        )
        .route(
            "/general-accounts/:id",
            get(get_account_handler)
                .put(update_account_handler)
                .delete(delete_account_handler),
        )
        .route("/general-accounts/:id/holders", get(account_holders_handler))
        .route(
            "/account-holders",
            get(list_holders_handler).post(create_holder_handler),
        )
        .route(
            "/account-holders/:id",
            get(get_holder_handler)
                .put(update_holder_handler)
                .delete(delete_holder_handler),
        )
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("Server running on http://localhost:3000");
    println!("  Rep codes: http://localhost:3000/api/rep-codes");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

// Total Compensation Dashboard - Web Server
// REST API over the in-memory grant registry. State lives for the lifetime
// of the process; there is no database.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tower_http::cors::CorsLayer;

use total_comp::{
    compensation, refresh, valuation, Bonus, CompensationProfile, Grant, GrantParams,
    GrantRegistry, PriceSource, StaticPriceSource, ValuationSummary, VestingTranche,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    grants: Arc<GrantRegistry>,
    profile: Arc<RwLock<CompensationProfile>>,
    prices: Arc<StaticPriceSource>,
}

/// API Response wrapper
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

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

/// Grant + its valuation rollup
#[derive(Serialize)]
struct GrantResponse {
    #[serde(flatten)]
    grant: Grant,
    summary: ValuationSummary,
}

impl GrantResponse {
    fn new(grant: Grant, as_of: NaiveDate) -> Self {
        let summary = valuation::summarize(&grant, as_of);
        Self { grant, summary }
    }
}

/// Schedule response (tranche table only)
#[derive(Serialize)]
struct ScheduleResponse {
    grant_id: String,
    symbol: String,
    tranches: Vec<VestingTranche>,
}

/// Dashboard response
#[derive(Serialize)]
struct SummaryResponse {
    summary: compensation::DashboardSummary,
    timeline: Vec<compensation::YearSummary>,
}

#[derive(Deserialize)]
struct ProfileRequest {
    annual_salary: f64,
    #[serde(default)]
    bonuses: Vec<Bonus>,
}

#[derive(Deserialize)]
struct PriceRequest {
    price: f64,
}

#[derive(Serialize)]
struct PriceResponse {
    symbol: String,
    price: f64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/grants - All grants with valuation summaries
async fn list_grants(State(state): State<AppState>) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let response: Vec<GrantResponse> = state
        .grants
        .snapshot()
        .into_iter()
        .map(|g| GrantResponse::new(g, today))
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(response)))
}

/// POST /api/grants - Register a grant (schedule generated immediately)
async fn create_grant(
    State(state): State<AppState>,
    Json(params): Json<GrantParams>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();

    match Grant::new(params) {
        Ok(grant) => {
            // Attach prices right away so the first read is already valued
            let grant = valuation::reprice(&grant, state.prices.as_ref(), today);
            let response = GrantResponse::new(grant.clone(), today);
            state.grants.add(grant);
            (StatusCode::CREATED, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::err(e.to_string())),
        )
            .into_response(),
    }
}

/// DELETE /api/grants/:id - Remove a grant
async fn delete_grant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.grants.remove(&id) {
        (StatusCode::OK, Json(ApiResponse::ok(id))).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("no grant with id {}", id))),
        )
            .into_response()
    }
}

/// GET /api/grants/:id/schedule - Tranche table for one grant
async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.grants.get(&id) {
        Some(grant) => {
            let response = ScheduleResponse {
                grant_id: grant.id.clone(),
                symbol: grant.symbol.clone(),
                tranches: grant.tranches,
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("no grant with id {}", id))),
        )
            .into_response(),
    }
}

/// GET /api/summary - Dashboard totals + yearly timeline
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let grants = state.grants.snapshot();
    let profile = state.profile.read().unwrap().clone();

    let response = SummaryResponse {
        summary: compensation::dashboard_summary(&profile, &grants, today),
        timeline: compensation::yearly_breakdown(&profile, &grants),
    };

    (StatusCode::OK, Json(ApiResponse::ok(response)))
}

/// PUT /api/profile - Replace the salary/bonus profile
async fn put_profile(
    State(state): State<AppState>,
    Json(request): Json<ProfileRequest>,
) -> impl IntoResponse {
    let mut profile = state.profile.write().unwrap();
    *profile = CompensationProfile {
        annual_salary: request.annual_salary,
        bonuses: request.bonuses,
    };
    (StatusCode::OK, Json(ApiResponse::ok("OK")))
}

/// GET /api/prices/:symbol - Current quote
async fn get_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded symbol (e.g. BRK.B variants)
    let symbol = urlencoding::decode(&symbol)
        .unwrap_or_else(|_| symbol.clone().into())
        .into_owned();

    match state.prices.current_price(&symbol) {
        Ok(price) => (
            StatusCode::OK,
            Json(ApiResponse::ok(PriceResponse {
                symbol: symbol.to_uppercase(),
                price,
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(e.to_string())),
        )
            .into_response(),
    }
}

/// PUT /api/prices/:symbol - Seed/update a quote in the in-memory source
async fn put_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(request): Json<PriceRequest>,
) -> impl IntoResponse {
    let symbol = urlencoding::decode(&symbol)
        .unwrap_or_else(|_| symbol.clone().into())
        .into_owned();

    if request.price <= 0.0 || !request.price.is_finite() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::err("price must be a positive number".to_string())),
        )
            .into_response();
    }

    state.prices.set_quote(&symbol, request.price);
    (
        StatusCode::OK,
        Json(ApiResponse::ok(PriceResponse {
            symbol: symbol.to_uppercase(),
            price: request.price,
        })),
    )
        .into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("💰 Total Compensation Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let state = AppState {
        grants: Arc::new(GrantRegistry::new()),
        profile: Arc::new(RwLock::new(CompensationProfile::default())),
        prices: Arc::new(StaticPriceSource::new(Utc::now().date_naive())),
    };

    // Periodic reprice of every held grant (60s cadence)
    let refresh_source: Arc<dyn PriceSource + Send + Sync> = state.prices.clone();
    tokio::spawn(refresh::run(
        state.grants.clone(),
        refresh_source,
        refresh::DEFAULT_REFRESH_INTERVAL,
    ));

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/grants", get(list_grants).post(create_grant))
        .route("/grants/:id", axum::routing::delete(delete_grant))
        .route("/grants/:id/schedule", get(get_schedule))
        .route("/summary", get(get_summary))
        .route("/profile", put(put_profile))
        .route("/prices/:symbol", get(get_price).put(put_price))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/summary");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

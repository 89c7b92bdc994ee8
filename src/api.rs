// 🌐 REST API with Axum
//
// Routing only: every handler locks the registry for one operation and maps
// the outcome to a status code. All decisions live in the registry.

use crate::db::SqliteStore;
use crate::error::RegistryError;
use crate::model::{MessageResponse, SwiftCodeRecord};
use crate::registry::SwiftCodeRegistry;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::InvalidHeaderValue, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Path segment of the import route, which shadows a code of the same name
const IMPORT_SEGMENT: &str = "import";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    registry: Arc<Mutex<SwiftCodeRegistry<SqliteStore>>>,
    import_csv: Arc<PathBuf>,
}

impl AppState {
    pub fn new(registry: SwiftCodeRegistry<SqliteStore>, import_csv: PathBuf) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            import_csv: Arc::new(import_csv),
        }
    }

    /// One operation at a time against the store
    fn registry(&self) -> MutexGuard<'_, SwiftCodeRegistry<SqliteStore>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        (status, Json(MessageResponse::new(self.message()))).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "OK" })
}

/// GET /v1/swift-codes/:swift_code - One code, plus branches for a headquarter
async fn get_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Response, RegistryError> {
    let detail = state.registry().get_by_code(&swift_code)?;
    Ok(Json(detail).into_response())
}

/// GET /v1/swift-codes/country/:country_iso2 - All codes for a country
async fn get_swift_codes_by_country(
    State(state): State<AppState>,
    Path(country_iso2): Path<String>,
) -> Result<Response, RegistryError> {
    let listing = state.registry().list_by_country(&country_iso2)?;
    Ok(Json(listing).into_response())
}

/// POST /v1/swift-codes - Add a new code
///
/// Unreadable bodies are answered like any other format error.
async fn add_swift_code(
    State(state): State<AppState>,
    payload: Result<Json<SwiftCodeRecord>, JsonRejection>,
) -> Result<Response, RegistryError> {
    let Json(candidate) = payload.map_err(|rejection| {
        RegistryError::Format(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let saved = state.registry().add(candidate)?;
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

/// DELETE /v1/swift-codes/:swift_code - Delete by exact code
async fn delete_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Response, RegistryError> {
    let confirmation = state.registry().delete(&swift_code)?;
    Ok(Json(confirmation).into_response())
}

/// GET /v1/swift-codes/import - `import` read as a code
async fn get_import_as_code(State(state): State<AppState>) -> Result<Response, RegistryError> {
    get_swift_code(State(state), Path(IMPORT_SEGMENT.to_string())).await
}

/// DELETE /v1/swift-codes/import - `import` read as a code
async fn delete_import_as_code(State(state): State<AppState>) -> Result<Response, RegistryError> {
    delete_swift_code(State(state), Path(IMPORT_SEGMENT.to_string())).await
}

/// POST /v1/swift-codes/import - Re-run the CSV import
async fn import_swift_codes(State(state): State<AppState>) -> Result<Response, RegistryError> {
    let summary = state.registry().bulk_import(&state.import_csv)?;
    Ok(Json(summary).into_response())
}

// ============================================================================
// Router
// ============================================================================

/// CORS for one origin, or any origin when none is configured.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    match origin {
        Some(origin) => Ok(CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any)),
        None => Ok(CorsLayer::permissive()),
    }
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/swift-codes", post(add_swift_code))
        .route(
            "/v1/swift-codes/import",
            post(import_swift_codes)
                .get(get_import_as_code)
                .delete(delete_import_as_code),
        )
        .route(
            "/v1/swift-codes/country/:country_iso2",
            get(get_swift_codes_by_country),
        )
        .route(
            "/v1/swift-codes/:swift_code",
            get(get_swift_code).delete(delete_swift_code),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

//! HTTP API
//!
//! REST endpoints:
//! - GET /health - Health check
//! - POST /v1/search - Permission-aware search
//! - GET /v1/access - Single permission check
//! - GET /v1/documents - List documents
//! - POST /v1/documents - Batched add/update/upsert
//! - POST /v1/documents/delete - Delete by id
//! - POST /v1/admin/reset - Reset the collection
//!
//! `user_id` is taken from the request as-is; there is no authentication.

use crate::acl::{permission, AccessControl};
use crate::admin::{IndexAdministrator, WriteOperation};
use crate::config::{ApiConfig, EngineConfig};
use crate::error::SearchError;
use crate::index::{Document, Metadata, VectorIndexClient};
use crate::search::{SearchEngine, SearchMethod, SearchRequest, SearchResult};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// API state
#[derive(Debug)]
pub struct ApiState {
    pub index: Arc<dyn VectorIndexClient>,
    pub acl: Arc<dyn AccessControl>,
    pub admin: IndexAdministrator,
    pub collection: String,
    pub default_top_k: usize,
    pub default_method: SearchMethod,
}

impl ApiState {
    pub fn new(
        index: Arc<dyn VectorIndexClient>,
        acl: Arc<dyn AccessControl>,
        engine: &EngineConfig,
    ) -> Self {
        let admin = IndexAdministrator::new(index.clone(), engine.collection_name.clone(), acl.clone());
        Self {
            index,
            acl,
            admin,
            collection: engine.collection_name.clone(),
            default_top_k: engine.default_top_k,
            default_method: engine.search_method,
        }
    }
}

/// Build the router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/search", post(search))
        .route("/v1/access", get(check_access))
        .route("/v1/documents", get(list_documents).post(write_documents))
        .route("/v1/documents/delete", post(delete_documents))
        .route("/v1/admin/reset", post(reset_collection))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve(
    state: Arc<ApiState>,
    config: &ApiConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Health check
async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
        collection: state.collection.clone(),
        documents: state.admin.count().ok(),
    })
}

/// Search on behalf of a user
async fn search(
    State(state): State<Arc<ApiState>>,
    ApiJson(request): ApiJson<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();

    let method: SearchMethod = match request.method.as_deref() {
        Some(name) => name.parse()?,
        None => state.default_method,
    };

    let top_k = match request.top_k {
        Some(k) => usize::try_from(k).map_err(|_| {
            SearchError::invalid_argument(format!("top_k must be positive, got {}", k))
        })?,
        None => state.default_top_k,
    };

    let mut query = SearchRequest::new(request.query).method(method).top_k(top_k);
    if let Some(user_id) = request.user_id {
        query = query.user(user_id);
    }

    let engine = SearchEngine::new(state.index.clone(), state.collection.clone(), state.acl.clone())?;
    let results = engine.search(&query)?;

    Ok(Json(SearchResponse {
        count: results.len(),
        method: method.as_str(),
        results,
        latency_ms: start.elapsed().as_secs_f64() * 1000.0,
    }))
}

/// Check one permission
async fn check_access(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AccessQuery>,
) -> Json<AccessResponse> {
    let permission = query.permission.unwrap_or_else(|| permission::READ.to_string());
    let allowed = state.acl.can_access(&query.user_id, &query.resource_id, &permission);

    Json(AccessResponse {
        user_id: query.user_id,
        resource_id: query.resource_id,
        permission,
        allowed,
    })
}

/// List every document
async fn list_documents(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    let documents = state.admin.get_all_documents()?;
    Ok(Json(DocumentsResponse {
        count: documents.len(),
        documents,
    }))
}

/// Batched write
async fn write_documents(
    State(state): State<Arc<ApiState>>,
    ApiJson(request): ApiJson<WriteBody>,
) -> Result<Json<WriteResponse>, ApiError> {
    let operation: WriteOperation = match request.operation.as_deref() {
        Some(name) => name.parse()?,
        None => WriteOperation::default(),
    };

    let written = state
        .admin
        .update_db(request.ids, request.documents, request.metadatas, operation)?;

    Ok(Json(WriteResponse {
        written,
        operation: operation.as_str(),
    }))
}

/// Delete by id
async fn delete_documents(
    State(state): State<Arc<ApiState>>,
    ApiJson(request): ApiJson<DeleteBody>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.admin.delete_documents(&request.ids)?;
    Ok(Json(DeleteResponse { removed }))
}

/// Reset the collection
async fn reset_collection(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ResetResponse>, ApiError> {
    state.admin.init_db()?;
    Ok(Json(ResetResponse {
        status: "reset".to_string(),
        collection: state.collection.clone(),
    }))
}

// ============================================================================
// REQUEST/RESPONSE TYPES
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    collection: String,
    documents: Option<usize>,
}

#[derive(Deserialize)]
struct SearchBody {
    query: String,
    user_id: Option<String>,
    method: Option<String>,
    top_k: Option<i64>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
    count: usize,
    method: &'static str,
    latency_ms: f64,
}

#[derive(Deserialize)]
struct AccessQuery {
    user_id: String,
    resource_id: String,
    permission: Option<String>,
}

#[derive(Serialize)]
struct AccessResponse {
    user_id: String,
    resource_id: String,
    permission: String,
    allowed: bool,
}

#[derive(Serialize)]
struct DocumentsResponse {
    documents: Vec<Document>,
    count: usize,
}

#[derive(Deserialize)]
struct WriteBody {
    ids: Vec<String>,
    documents: Vec<String>,
    metadatas: Option<Vec<Metadata>>,
    operation: Option<String>,
}

#[derive(Serialize)]
struct WriteResponse {
    written: usize,
    operation: &'static str,
}

#[derive(Deserialize)]
struct DeleteBody {
    ids: Vec<String>,
}

#[derive(Serialize)]
struct DeleteResponse {
    removed: usize,
}

#[derive(Serialize)]
struct ResetResponse {
    status: String,
    collection: String,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        ApiError(e)
    }
}

/// JSON body extractor whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct ApiJson<T>(T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(SearchError::invalid_argument(rejection.body_text()))
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            SearchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SearchError::NotFound { .. } => StatusCode::NOT_FOUND,
            SearchError::Conflict { .. } => StatusCode::CONFLICT,
            SearchError::NotInitialized { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.0.to_string()
        });

        (status, Json(body)).into_response()
    }
}

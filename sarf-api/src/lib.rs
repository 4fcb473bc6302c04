use std::future::Future;
use std::sync::{Arc, OnceLock};

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sarf_core::{canonical_root, CoreError};
use sarf_index::{DerivedWord, RootEntry, Scheme, TreeShape};
use sarf_morph::{CategoryInfo, Slot, VerbCategory};
use sarf_storage::{Storage, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    storage: Arc<Mutex<Storage>>,
    metrics: PrometheusHandle,
}

fn init_metrics_recorder() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                warn!("a metrics recorder was already installed; /metrics will stay empty");
            }
            handle
        })
        .clone()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(err) | ApiError::Storage(StorageError::Core(err)) => match err {
                CoreError::InvalidRoot(_) | CoreError::InvalidScheme(_) => StatusCode::BAD_REQUEST,
                CoreError::RootMissing(_) | CoreError::SchemeMissing(_) => StatusCode::NOT_FOUND,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootView {
    pub root: String,
    pub category: VerbCategory,
    pub category_label: String,
    pub derived_words: Vec<DerivedWord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<CategoryInfo>,
}

impl RootView {
    fn new(entry: &RootEntry, info: Option<&CategoryInfo>) -> Self {
        Self {
            root: entry.root.clone(),
            category: entry.category,
            category_label: entry.category.label().to_string(),
            derived_words: entry.derived_words.clone(),
            info: info.cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub root: String,
    pub category: VerbCategory,
    pub category_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<CategoryInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub word: String,
    pub category: VerbCategory,
    pub slot: Slot,
    pub frequency: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RootQuery {
    root: String,
}

#[derive(Debug, Deserialize)]
struct GenerateQuery {
    root: String,
    scheme_id: String,
}

#[derive(Debug, Deserialize)]
struct ValidateQuery {
    word: String,
    root_str: String,
}

pub fn build_router(storage: Storage) -> Router {
    let metrics = init_metrics_recorder();
    let state = AppState {
        storage: Arc::new(Mutex::new(storage)),
        metrics,
    };

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .route("/api/roots", get(list_roots).post(add_root))
        .route("/api/roots/visual", get(roots_visual))
        .route("/api/roots/:root", get(get_root))
        .route("/api/schemes", get(list_schemes).post(add_scheme))
        .route("/api/generate", post(generate))
        .route("/api/validate", post(validate))
        .route("/api/classify", get(classify))
        .route("/api/compact", post(compact))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(
    listener: TcpListener,
    storage: Storage,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> JoinHandle<Result<(), std::io::Error>> {
    let app = build_router(storage);
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    (StatusCode::OK, state.metrics.render()).into_response()
}

async fn list_roots(State(state): State<AppState>) -> Json<Vec<RootView>> {
    let storage = state.storage.lock().await;
    let ctx = storage.context();
    Json(
        ctx.roots()
            .into_iter()
            .map(|entry| RootView::new(entry, None))
            .collect(),
    )
}

async fn roots_visual(State(state): State<AppState>) -> Json<Option<TreeShape>> {
    let storage = state.storage.lock().await;
    Json(storage.context().visualize())
}

async fn add_root(
    State(state): State<AppState>,
    Query(query): Query<RootQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut storage = state.storage.lock().await;
    let entry = storage.add_root(&query.root)?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "root": entry.root,
        "category": entry.category,
    })))
}

async fn get_root(
    State(state): State<AppState>,
    AxumPath(root): AxumPath<String>,
) -> Result<Json<RootView>, ApiError> {
    let canonical = canonical_root(&root)?;
    let storage = state.storage.lock().await;
    let ctx = storage.context();
    let entry = ctx
        .lookup_root(&canonical)
        .ok_or_else(|| ApiError::NotFound(format!("root `{canonical}`")))?;
    Ok(Json(RootView::new(entry, ctx.category_info(entry.category))))
}

async fn list_schemes(State(state): State<AppState>) -> Json<Vec<Scheme>> {
    let storage = state.storage.lock().await;
    Json(storage.context().schemes().into_iter().cloned().collect())
}

async fn add_scheme(
    State(state): State<AppState>,
    Json(scheme): Json<Scheme>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut storage = state.storage.lock().await;
    let replaced = storage.add_scheme(scheme)?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "replaced": replaced.is_some(),
    })))
}

async fn generate(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let mut storage = state.storage.lock().await;
    let generated = storage.generate(&query.root, &query.scheme_id)?;
    Ok(Json(GenerateResponse {
        word: generated.word,
        category: generated.category,
        slot: generated.slot,
        frequency: generated.frequency,
    }))
}

async fn validate(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Result<Json<ValidateResponse>, ApiError> {
    if query.word.trim().is_empty() {
        return Err(ApiError::BadRequest("word must not be empty".into()));
    }
    let mut storage = state.storage.lock().await;
    let validation = storage.validate(&query.word, &query.root_str)?;
    Ok(Json(ValidateResponse {
        is_valid: validation.is_valid,
        scheme: validation.matched_scheme_id,
        generated: validation.generated,
    }))
}

async fn classify(
    State(state): State<AppState>,
    Query(query): Query<RootQuery>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let root = canonical_root(&query.root)?;
    let storage = state.storage.lock().await;
    let ctx = storage.context();
    let category = ctx.classify(&root);
    Ok(Json(ClassifyResponse {
        category_label: category.label().to_string(),
        info: ctx.category_info(category).cloned(),
        root,
        category,
    }))
}

async fn compact(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let mut storage = state.storage.lock().await;
    let folded = storage.journal_len();
    storage.compact()?;
    info!(folded, "compacted on request");
    Ok(Json(serde_json::json!({ "status": "ok", "folded": folded })))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use std::{
    time::Duration,
    sync::{atomic::{AtomicI64, Ordering}, RwLock},
};
use serde::Serialize;
use serde_json::{json, Value};
use sysinfo::System;
use tracing::instrument;

use crate::{
    constants::{DOCS_PAGE_LIMIT, HEALTH_CACHE_SECS, START_TIME},
    entities::envelope::ApiResponse,
    errors::AppError,
    repositories::document_store::{DocumentQuery, DocumentStore},
    storage::ObjectStore,
    AppState,
};

#[derive(Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: String,
    document_store: String,
    document_store_connected: bool,
    object_store: String,
    object_store_connected: bool,
    memory_usage: String,
    system: SystemInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let mut sys = System::new_all();
    sys.refresh_all();

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    let (documents_ok, objects_ok) = tokio::join!(
        state.document_store.check_connection(),
        state.object_store.check_connection(),
    );

    let process = sysinfo::get_current_pid().ok().and_then(|pid| sys.process(pid));
    let memory_usage = process.map_or("Unknown".to_string(), |p|
        format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0)
    );

    HealthCheckResponse {
        status: "healthy".to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        document_store: state.document_store.backend_name().to_string(),
        document_store_connected: documents_ok.is_ok(),
        object_store: state.object_store.backend_name().to_string(),
        object_store_connected: objects_ok.is_ok(),
        memory_usage,
        system: system_info,
    }
}

/// Liveness. Always 200; store reachability is reported, not enforced.
/// The result is cached for a few seconds.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    let response = if now - last > HEALTH_CACHE_SECS {
        let response = build_health_response(&state).await;

        if let Ok(mut cache) = CACHED_STATUS.write() {
            *cache = response.clone();
            LAST_CHECK.store(now, Ordering::Relaxed);
        }
        response
    } else {
        match CACHED_STATUS.read() {
            Ok(response) => response.clone(),
            Err(e) => {
                tracing::warn!("HealthCheck cache lock poisoned: {}", e);
                build_health_response(&state).await
            }
        }
    };

    HttpResponse::Ok().json(ApiResponse::success(response).with_message("Server is running"))
}

/// Checks the document store. 500 when it cannot be reached.
#[instrument(skip(state))]
async fn firebase_status(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    state.document_store.check_connection().await?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::success(json!({
            "connected": true,
            "backend": state.document_store.backend_name(),
            "projectId": state.project_id,
        }))
        .with_message("Document store connection is healthy"),
    ))
}

/// Dumps up to [`DOCS_PAGE_LIMIT`] raw documents from the default collection.
#[instrument(skip(state))]
async fn list_documents(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let documents: Vec<Value> = state
        .document_store
        .list(&state.default_collection, &DocumentQuery::new().limit(DOCS_PAGE_LIMIT))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "collection": state.default_collection,
        "count": documents.len(),
        "documents": documents,
    }))))
}

pub async fn route_not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!(
        "Route {} {} not found",
        req.method(),
        req.path()
    )))
}

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/health")
            .route(web::get().to(health_check))
            .default_service(web::to(route_not_found))
    )
    .service(
        web::resource("/firebase-status")
            .route(web::get().to(firebase_status))
            .default_service(web::to(route_not_found))
    )
    .service(
        web::resource("/docs")
            .route(web::get().to(list_documents))
            .default_service(web::to(route_not_found))
    );
}

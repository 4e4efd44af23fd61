use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::{entities::envelope::ApiResponse, AppState};

pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(
        ApiResponse::success(json!({
            "name": state.app_name,
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health",
                "documentStore": "/firebase-status",
                "docs": "/docs",
                "media": "/api/media",
                "wishes": "/api/wishes",
            },
        }))
        .with_message("Welcome to the Wedding Invitation API!"),
    )
}

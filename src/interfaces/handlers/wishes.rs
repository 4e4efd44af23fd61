use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        envelope::ApiResponse,
        media::LikeRequest,
        wish::{ListWishesQuery, NewWishRequest, UpdateWishRequest},
    },
    errors::AppError,
    AppState,
};

#[instrument(skip(state, data))]
pub async fn create_wish(
    state: web::Data<AppState>,
    data: web::Json<NewWishRequest>,
) -> Result<impl Responder, AppError> {
    let wish = state.wish_handler.create_wish(data.into_inner()).await?;

    Ok(HttpResponse::Created().json(
        ApiResponse::success(wish).with_message("Wish created successfully"),
    ))
}

#[instrument(skip(state, query))]
pub async fn list_wishes(
    state: web::Data<AppState>,
    query: web::Query<ListWishesQuery>,
) -> Result<impl Responder, AppError> {
    let wishes = state.wish_handler.list_wishes(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(wishes)))
}

#[instrument(skip(state))]
pub async fn get_wish(
    wish_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let wish = state.wish_handler.get_wish(&wish_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(wish)))
}

#[instrument(skip(state, data))]
pub async fn update_wish(
    wish_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateWishRequest>,
) -> Result<impl Responder, AppError> {
    let wish = state
        .wish_handler
        .update_wish(&wish_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::success(wish).with_message("Wish updated successfully"),
    ))
}

#[instrument(skip(state))]
pub async fn delete_wish(
    wish_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.wish_handler.delete_wish(&wish_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message_only("Wish deleted successfully")))
}

#[instrument(skip(state, data), fields(action = ?data.action))]
pub async fn like_wish(
    wish_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<LikeRequest>,
) -> Result<impl Responder, AppError> {
    let likes = state.wish_handler.like_wish(&wish_id, data.action).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(likes)))
}

#[instrument(skip(state))]
pub async fn wish_stats(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let stats = state.wish_handler.wish_stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

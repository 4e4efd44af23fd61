use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        envelope::ApiResponse,
        media::{LikeRequest, ListMediaQuery, MediaUploadForm, NewMediaUpload, UpdateMediaRequest},
    },
    errors::AppError,
    utils::upload_file::read_uploaded_file,
    AppState,
};

#[instrument(skip(state, form))]
pub async fn upload_media(
    state: web::Data<AppState>,
    form: MultipartForm<MediaUploadForm>,
) -> Result<impl Responder, AppError> {
    let media_handler = &state.media_handler;
    let form = form.into_inner();

    let file = form
        .media
        .ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;

    let uploaded = read_uploaded_file(
        file.file_name.as_deref(),
        file.content_type.as_ref().map(|m| m.essence_str()),
        file.file.path(),
        state.max_upload_bytes,
    )
    .await?;

    let item = media_handler
        .upload_media(NewMediaUpload {
            bytes: uploaded.bytes,
            original_name: uploaded.original_name,
            mime_type: uploaded.mime_type,
            title: form.title.map(|t| t.into_inner()),
            date: form.date.map(|d| d.into_inner()),
            requested_type: form.media_type.map(|t| t.into_inner()),
        })
        .await?;

    Ok(HttpResponse::Created().json(
        ApiResponse::success(item).with_message("Media uploaded successfully"),
    ))
}

#[instrument(skip(state, query))]
pub async fn list_media(
    state: web::Data<AppState>,
    query: web::Query<ListMediaQuery>,
) -> Result<impl Responder, AppError> {
    let items = state.media_handler.list_media(query.media_type).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

#[instrument(skip(state))]
pub async fn get_media(
    media_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let item = state.media_handler.get_media(&media_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

#[instrument(skip(state, data))]
pub async fn update_media(
    media_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateMediaRequest>,
) -> Result<impl Responder, AppError> {
    let item = state
        .media_handler
        .update_media(&media_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::success(item).with_message("Media updated successfully"),
    ))
}

#[instrument(skip(state))]
pub async fn delete_media(
    media_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.media_handler.delete_media(&media_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message_only("Media deleted successfully")))
}

#[instrument(skip(state, data), fields(action = ?data.action))]
pub async fn like_media(
    media_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<LikeRequest>,
) -> Result<impl Responder, AppError> {
    let likes = state.media_handler.like_media(&media_id, data.action).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(likes)))
}

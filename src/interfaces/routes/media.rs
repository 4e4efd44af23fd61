use actix_web::web;

use crate::handlers::{media, system::route_not_found};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/media")
            .service(
                web::resource("")
                    .route(web::get().to(media::list_media))
                    .default_service(web::to(route_not_found))
            )
            .service(
                web::resource("/upload")
                    .route(web::post().to(media::upload_media))
                    .default_service(web::to(route_not_found))
            )
            .service(
                web::resource("/{media_id}")
                    .route(web::get().to(media::get_media))
                    .route(web::put().to(media::update_media))
                    .route(web::delete().to(media::delete_media))
                    .default_service(web::to(route_not_found))
            )
            .service(
                web::resource("/{media_id}/like")
                    .route(web::post().to(media::like_media))
                    .default_service(web::to(route_not_found))
            )
    );
}

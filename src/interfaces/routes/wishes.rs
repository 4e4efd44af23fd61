use actix_web::web;

use crate::handlers::{system::route_not_found, wishes};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wishes")
            .service(
                web::resource("")
                    .route(web::post().to(wishes::create_wish))
                    .route(web::get().to(wishes::list_wishes))
                    .default_service(web::to(route_not_found))
            )
            // Registered before "/{wish_id}" so "stats" is not taken as an id
            .service(
                web::resource("/stats/overview")
                    .route(web::get().to(wishes::wish_stats))
                    .default_service(web::to(route_not_found))
            )
            .service(
                web::resource("/{wish_id}")
                    .route(web::get().to(wishes::get_wish))
                    .route(web::put().to(wishes::update_wish))
                    .route(web::delete().to(wishes::delete_wish))
                    .default_service(web::to(route_not_found))
            )
            .service(
                web::resource("/{wish_id}/like")
                    .route(web::post().to(wishes::like_wish))
                    .default_service(web::to(route_not_found))
            )
    );
}

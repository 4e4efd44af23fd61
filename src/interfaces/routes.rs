use actix_web::web;

use crate::handlers::{home::home, system::{self, route_not_found}};

mod extractors;
mod media;
mod wishes;

pub fn configure_routes(cfg: &mut web::ServiceConfig, max_upload_bytes: usize) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(home))
            .default_service(web::to(route_not_found))
    );
    cfg.configure(system::config_routes);

    cfg.service(
        web::scope("/api")
            .configure(media::config_routes)
            .configure(wishes::config_routes)
    );

    extractors::config_routes(cfg, max_upload_bytes);
}

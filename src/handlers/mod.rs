pub mod health;
pub mod logs;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health::index)))
        .service(
            web::resource("/logs")
                .route(web::get().to(logs::list_logs))
                .route(web::post().to(logs::create_log)),
        )
        .service(
            web::resource("/logs/{logId}")
                .route(web::put().to(logs::update_log))
                .route(web::delete().to(logs::delete_log)),
        );
}

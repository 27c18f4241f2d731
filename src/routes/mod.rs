pub mod auth;
pub mod health;
pub mod images;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Registers every route. Everything except `/health`, `/auth/register` and
/// `/auth/login` sits behind [`AuthMiddleware`].
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register)
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::me)),
                ),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task)
                .service(tasks::upload_image),
        )
        .service(
            web::scope("/images")
                .wrap(AuthMiddleware)
                .service(images::get_image)
                .service(images::delete_image),
        );
}

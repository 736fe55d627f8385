use actix_web::error::InternalError;
use actix_web::web::{JsonConfig, QueryConfig};
use actix_web::HttpResponse;
use paperclip::actix::web;

use crate::api::ErrorResponse;
use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api/books")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::get_books))
                        .route(web::post().to(handlers::add_book)),
                )
                .service(
                    web::resource("/{book_id}")
                        .route(web::get().to(handlers::get_book))
                        .route(web::put().to(handlers::update_book)),
                ),
        );
}

/// Body that does not match the book schema is rejected with 422
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::UnprocessableEntity().json(ErrorResponse::new(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

/// Filter values of a wrong type, e.g. non-numeric prices, are rejected with 422
pub fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::UnprocessableEntity().json(ErrorResponse::new(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

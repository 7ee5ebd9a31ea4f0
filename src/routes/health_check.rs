use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Liveness probe for the hosting platform; always an empty 200.
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }

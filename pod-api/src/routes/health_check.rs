use actix_web::{HttpResponse, Responder, get};

#[utoipa::path(
    summary = "Pod API health status",
    description = "Returns 'ok' while the server accepts requests. Neither the database nor the cluster is contacted.",
    responses(
        (status = 200, description = "Server is up; returns 'ok'.", body = String),
    ),
    tag = "Health",
)]
#[get("/health_check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

use actix_web::HttpResponse;
use serde_json::json;

// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Gym Tracker API is running" }))
}

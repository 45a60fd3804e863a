use axum::Json;

use crate::models::MessageResponse;

pub async fn portfolio_v1() -> Json<MessageResponse> {
    Json(MessageResponse::new("API Version 1"))
}

pub async fn portfolio_v2() -> Json<MessageResponse> {
    Json(MessageResponse::new("API Version 2 with improved features!"))
}

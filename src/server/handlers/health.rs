use crate::core::response::{ApiResponse, ApiResult};
use serde_json::{Value, json};

pub async fn healthcheck() -> ApiResult<Value> {
    Ok(ApiResponse::ok(json!({ "status": "OK" }), "Health check passed"))
}

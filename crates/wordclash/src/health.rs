//! The HTTP health endpoint: `GET /` answering a fixed payload,
//! entirely unrelated to session state.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Builds the single-route health router.
pub(crate) fn router() -> Router {
    Router::new().route("/", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "data": "Hello!" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_payload_is_fixed_acknowledgement() {
        let Json(body) = health().await;
        assert_eq!(body, json!({ "data": "Hello!" }));
    }
}

//! Liveness endpoint.

use http::StatusCode;
use serde::Serialize;

use crate::response::{json_response, HttpResponse};

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
}

/// Answers the liveness probe.
///
/// Deliberately independent of the upstream APIs: a healthy process answers
/// even when the upstreams are down, because restarting it would not help.
pub fn health_response() -> HttpResponse {
    json_response(StatusCode::OK, &HealthStatus { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_health_payload() {
        let response = health_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
    }
}

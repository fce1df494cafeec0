//! JSON response envelope.
//!
//! Every API response is either `{data, meta}` or `{error, meta}`, with the
//! request ID in `meta` so a client report can be matched to server logs.
//! The liveness endpoint is the one deliberate exception; it answers with a
//! bare payload.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use serde_json::Value;

use pokedex_core::RequestId;

/// Body type for every response the server produces.
pub type ResponseBody = Full<Bytes>;

/// Response alias used throughout the server.
pub type HttpResponse = Response<ResponseBody>;

/// Error code for unexpected failures.
pub const ERR_CODE_INTERNAL: &str = "INTERNAL_ERROR";

/// Error code for unknown resources.
pub const ERR_CODE_NOT_FOUND: &str = "NOT_FOUND";

/// Error code for malformed requests.
pub const ERR_CODE_BAD_REQUEST: &str = "BAD_REQUEST";

#[derive(Debug, Serialize)]
struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
struct Meta {
    request_id: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Wraps `data` in the envelope, with the request ID in `meta`.
pub fn json_data<T: Serialize>(status: StatusCode, request_id: RequestId, data: &T) -> HttpResponse {
    let envelope = Envelope {
        data: Some(serde_json::to_value(data).unwrap_or(Value::Null)),
        meta: Some(Meta {
            request_id: request_id.to_string(),
        }),
        error: None,
    };
    write_json(status, &envelope)
}

/// Builds an error envelope, with the request ID in `meta`.
pub fn json_error(
    status: StatusCode,
    request_id: RequestId,
    code: &str,
    message: &str,
) -> HttpResponse {
    let envelope = Envelope {
        data: None,
        meta: Some(Meta {
            request_id: request_id.to_string(),
        }),
        error: Some(ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }),
    };
    write_json(status, &envelope)
}

/// Serializes a bare payload without the envelope.
pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> HttpResponse {
    write_json(status, payload)
}

fn write_json<T: Serialize>(status: StatusCode, payload: &T) -> HttpResponse {
    let body = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)));

    // The only failure mode is an invalid header, and ours are constant.
    response.unwrap_or_else(|_| {
        let mut fallback = Response::new(Full::new(Bytes::from_static(b"{}")));
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

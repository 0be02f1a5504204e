//! Request handling and transformation.
//!
//! # Responsibilities
//! - Attach a request ID (UUID v4) as early as possible for tracing
//! - Turn an inbound URI into a pipeline [`ProxyRequest`]

use axum::http::{HeaderMap, HeaderName, Uri};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::pipeline::{ProxyRequest, QueryParams};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that generates an `x-request-id` when the client sent none.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that echoes the request ID on the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Request ID from headers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Build the pipeline request from the inbound URI.
///
/// The path is kept exactly as received; the query is decoded into ordered
/// parameters so the pipeline re-encodes it canonically.
pub fn to_proxy_request(uri: &Uri) -> ProxyRequest {
    let query_params = uri.query().map(QueryParams::parse).unwrap_or_default();
    ProxyRequest::new(uri.path(), query_params)
}

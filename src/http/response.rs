//! Response handling and transformation.
//!
//! Maps a pipeline [`ProxyResponse`] onto an HTTP response. Status and
//! headers are copied as-is; an out-of-range status becomes 500.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::pipeline::ProxyResponse;

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();

        for (name, value) in self.headers {
            match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!("Dropping invalid response header"),
            }
        }
        response
    }
}

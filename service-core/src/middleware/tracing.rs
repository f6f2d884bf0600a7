use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::observability::extract_request_id;
pub use crate::observability::REQUEST_ID_HEADER;

/// Propagates `x-request-id`, minting one when the caller did not send it.
/// The id is echoed on the response so webhook senders can correlate retries.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = extract_request_id(req.headers())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let Ok(header_value) = HeaderValue::from_str(&request_id) else {
        return next.run(req).await;
    };

    req.headers_mut()
        .insert(REQUEST_ID_HEADER, header_value.clone());

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER, header_value);

    response
}

//! Request forwarding.
//!
//! The gateway's `/api/<segment>/...` paths map onto the upstream services'
//! own route trees by dropping the `/api` prefix. Verified claims picked up
//! by the auth gate are translated into `X-User-*` headers here; nothing
//! else adds them.

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use api_error::{ApiError, Result};
use identity_propagation::{USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use token_core::Claims;

/// Connection-scoped headers that must not be forwarded in either direction.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Forward the request to `base_url`, returning the upstream response as-is.
pub async fn forward(
    req: &HttpRequest,
    body: web::Bytes,
    client: &reqwest::Client,
    base_url: &str,
) -> Result<HttpResponse> {
    let mut url = format!("{}{}", base_url, rewrite_path(req.path()));
    if let Some(query) = req.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|_| ApiError::Internal("Unsupported method".to_string()))?;

    let mut upstream = client.request(method, &url);

    // actix-web and reqwest sit on different `http` major versions, so
    // headers cross the boundary as raw names and bytes.
    for (name, value) in req.headers() {
        if skip_request_header(name.as_str()) {
            continue;
        }
        upstream = upstream.header(name.as_str(), value.as_bytes());
    }

    if let Some(claims) = req.extensions().get::<Claims>() {
        upstream = upstream
            .header(USER_ID_HEADER, claims.id.to_string())
            .header(USER_EMAIL_HEADER, claims.email.as_str())
            .header(USER_ROLE_HEADER, claims.role.as_str());
    }

    if !body.is_empty() {
        upstream = upstream.body(body.to_vec());
    }

    let response = upstream.send().await.map_err(|err| {
        tracing::warn!(url = %url, error = %err, "upstream request failed");
        ApiError::Unavailable("Service temporarily unavailable".to_string())
    })?;

    let status = actix_web::http::StatusCode::from_u16(response.status().as_u16())
        .map_err(|_| ApiError::Internal("Invalid upstream status".to_string()))?;

    let mut builder = HttpResponse::build(status);
    for (name, value) in response.headers() {
        if skip_response_header(name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            actix_web::http::header::HeaderName::from_bytes(name.as_str().as_bytes()),
            actix_web::http::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            builder.append_header((name, value));
        }
    }

    let bytes = response.bytes().await.map_err(|err| {
        tracing::warn!(url = %url, error = %err, "failed reading upstream body");
        ApiError::Unavailable("Service temporarily unavailable".to_string())
    })?;

    Ok(builder.body(bytes.to_vec()))
}

/// Strip the public `/api` prefix; upstream services mount their routes at
/// the root.
fn rewrite_path(path: &str) -> &str {
    match path.strip_prefix("/api") {
        Some("") | None => "/",
        Some(rest) => rest,
    }
}

fn skip_request_header(name: &str) -> bool {
    // Host and content-length are recomputed by the client; identity headers
    // are re-minted from verified claims only.
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
        || name.eq_ignore_ascii_case("host")
        || name.eq_ignore_ascii_case("content-length")
}

fn skip_response_header(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
        || name.eq_ignore_ascii_case("content-length")
}

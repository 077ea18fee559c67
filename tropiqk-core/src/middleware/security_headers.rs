use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Adds browser hardening headers to every page response.
///
/// Pages are server-rendered HTML that load their own scripts and styles from
/// `/static`, so the CSP is same-origin only. Media (track audio and artwork)
/// is served from the API host and allowed through `media-src`/`img-src`.
pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_static = req.uri().path().starts_with("/static/");

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    if !is_static {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 img-src 'self' https: data:; \
                 media-src 'self' https:; \
                 style-src 'self' 'unsafe-inline'; \
                 frame-ancestors 'none'",
            ),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        );
    }

    response
}

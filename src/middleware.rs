//! Cross-cutting HTTP middleware: CORS and security response headers.

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// Security headers applied to every response.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Extension trait for `axum::`[`Router`] to apply the gateway's middleware.
pub trait RouterSecurityExt {
    /// Adds permissive CORS handling for browser clients.
    fn with_cors(self) -> Self;

    /// Adds the standard set of security response headers.
    fn with_security_headers(self) -> Self;
}

impl<S> RouterSecurityExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_cors(self) -> Self {
        self.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::HEAD,
                    Method::PUT,
                    Method::PATCH,
                    Method::POST,
                    Method::DELETE,
                ])
                .allow_headers(Any),
        )
    }

    fn with_security_headers(self) -> Self {
        SECURITY_HEADERS
            .iter()
            .fold(self, |router, &(name, value)| {
                router.layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                ))
            })
    }
}

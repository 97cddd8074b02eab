//! Security headers set on every response.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Content-Security-Policy of rendered pages.
///
/// The mermaid runtime is loaded from jsDelivr and documents may embed
/// remote images.
const CSP: &str = "default-src 'self'; \
                   script-src 'self' https://cdn.jsdelivr.net; \
                   style-src 'self' 'unsafe-inline'; \
                   img-src 'self' data: https:; \
                   form-action 'self'; \
                   frame-ancestors 'none'";

const HEADERS: [(&str, &str); 4] = [
    ("content-security-policy", CSP),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "same-origin"),
];

/// One layer per security header, each overriding any value set by a handler.
pub(crate) fn header_layers() -> impl Iterator<Item = SetResponseHeaderLayer<HeaderValue>> {
    HEADERS.into_iter().map(|(name, value)| {
        SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_allows_mermaid_cdn() {
        assert!(CSP.contains("script-src 'self' https://cdn.jsdelivr.net"));
        assert!(CSP.contains("form-action 'self'"));
        assert!(CSP.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_header_layers_cover_every_header() {
        assert_eq!(header_layers().count(), HEADERS.len());
    }
}

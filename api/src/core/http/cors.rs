use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Any origin, any method, any header, credentials allowed.
///
/// Wildcards cannot be combined with credentials, so the request's own
/// origin, method and headers are echoed back instead.
pub fn permissive_with_credentials() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

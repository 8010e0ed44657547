use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Coarse classification of a request path, attached to every request log line.
pub fn route_area(path: &str) -> &'static str {
    if path.starts_with("/api/admin") {
        "admin"
    } else if path.starts_with("/api/auth") {
        "auth"
    } else if path.starts_with("/api/chat") {
        "chat"
    } else if path.starts_with("/api/forms") {
        "forms"
    } else if path.starts_with("/media") {
        "media"
    } else if path.starts_with("/health") {
        "health"
    } else {
        "public"
    }
}

fn request_id(request: &Request) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// One line per finished request; 5xx logs at error and 4xx at warn.
pub async fn log_request(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let area = route_area(&path);
    let id = request_id(&request);

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    macro_rules! finished {
        ($level:ident, $msg:literal) => {
            tracing::$level!(request_id = %id, %method, %path, area, status, elapsed_ms, $msg)
        };
    }
    match status {
        500.. => finished!(error, "request failed"),
        400..=499 => finished!(warn, "request rejected"),
        _ if area == "health" => finished!(debug, "probe served"),
        _ => finished!(info, "request served"),
    }

    response
}

/// Tags each request with an `x-request-id` UUID unless the client sent one.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Echoes the request id back on the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_area_classification() {
        assert_eq!(route_area("/api/admin/services"), "admin");
        assert_eq!(route_area("/api/auth/login"), "auth");
        assert_eq!(route_area("/api/chat"), "chat");
        assert_eq!(route_area("/api/forms/quote"), "forms");
        assert_eq!(route_area("/media/portfolio/a.jpg"), "media");
        assert_eq!(route_area("/health/ready"), "health");
        assert_eq!(route_area("/api/services"), "public");
    }

    #[test]
    fn test_request_id_falls_back_without_extension() {
        let request = Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap();
        assert_eq!(request_id(&request), "-");

        let mut request = Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap();
        request.extensions_mut().insert(RequestId::new(
            axum::http::HeaderValue::from_static("abc-123"),
        ));
        assert_eq!(request_id(&request), "abc-123");
    }
}

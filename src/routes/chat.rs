/**
 * Chat Proxy
 * Forwards visitor conversations to the chat-completion API with the
 * assistant's system prompt prepended, streaming the answer back as SSE.
 */
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ChatConfig;
use crate::routes::ErrorResponse;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

pub const SYSTEM_PROMPT: &str = r#"You are Beyond House Assistant, the friendly and knowledgeable assistant of Beyond House Interior Construction & Consultancy in Nairobi, Kenya.

## The company
Beyond House is an interior construction firm founded and directed by Dancan Odhiambo. The team transforms homes and offices with careful craftsmanship and original design, and has completed more than 100 projects across Kenya.

## Services
1. Ceiling Design: gypsum work, LED lighting, coffered and suspended ceilings, custom designs.
2. Cabinetry: wardrobes, kitchen cabinets, vanity units and storage built to measure from premium materials.
3. Walls & Décor: wood paneling, textures, accent walls, TV units, murals and decorative finishes.
4. Floors & Tiles: tiles, hardwood, parquet, vinyl and natural stone.

## Contact
- Phone: 0791 996 448
- Email: Beyondhouseint@gmail.com
- WhatsApp: +254791996448
- Location: Nairobi, Kenya

## The director
Dancan Odhiambo brings years of interior construction experience and a hands-on approach to every project.

## Strengths
- Premium materials and quality craftsmanship
- Designers and skilled craftsmen working as one team
- Solutions tailored to each client's vision
- Projects delivered on time

## How to help
Answer questions about services, the consultation and quote process, past projects, the design process and typical timelines. Help visitors pick the service that fits their needs. Pricing depends on the project, so when asked for prices invite the visitor to book a free consultation or request a quote.

Point visitors to the right page when it helps:
- /services for service details
- /portfolio for past projects
- /consultancy to book a consultation
- /contact to request a quote or get in touch
- /about to learn about the company

Always be warm, helpful and professional."#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("CHAT_API_KEY is not configured")]
    MissingApiKey,
    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,
    #[error("Service temporarily unavailable.")]
    PaymentRequired,
    #[error("AI service error")]
    Upstream(StatusCode),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl ChatError {
    fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            Self::MissingApiKey | Self::Upstream(_) | Self::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match &self {
            Self::Upstream(status) => tracing::error!(status = %status, "chat upstream error"),
            Self::RateLimited | Self::PaymentRequired => {
                tracing::warn!(error = %self, "chat upstream refused request")
            }
            _ => tracing::error!(error = %self, "chat request failed"),
        }
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Any origin may call the chat endpoint.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

pub fn chat_routes(config: ChatConfig) -> Router {
    Router::new()
        .route("/api/chat", post(chat).options(preflight))
        .layer(cors_layer())
        .with_state(config)
}

/// OPTIONS /api/chat without preflight headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// POST /api/chat
pub async fn chat(
    State(config): State<ChatConfig>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ChatError> {
    let api_key = config.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;

    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(ChatMessage {
        role: "system".to_string(),
        content: SYSTEM_PROMPT.to_string(),
    });
    messages.extend(request.messages);

    let turns = messages.len() - 1;
    let upstream = HTTP_CLIENT
        .post(&config.api_url)
        .bearer_auth(api_key)
        .json(&CompletionRequest {
            model: &config.model,
            messages,
            stream: true,
        })
        .send()
        .await?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(match status.as_u16() {
            429 => ChatError::RateLimited,
            402 => ChatError::PaymentRequired,
            code => {
                let text = upstream.text().await.unwrap_or_default();
                tracing::debug!(status = code, body = %text, "chat upstream body");
                ChatError::Upstream(
                    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
                )
            }
        });
    }

    tracing::info!(turns, model = %config.model, "chat stream started");

    Ok((
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Karibu\"}}]}\n\ndata: [DONE]\n\n";

    /// Fake completion API: the first path segment picks the outcome.
    async fn fake_upstream(Path(case): Path<String>, Json(body): Json<Value>) -> Response {
        match case.as_str() {
            "ok" => {
                let valid = body["stream"] == json!(true)
                    && body["model"] == json!("test-model")
                    && body["messages"][0]["role"] == json!("system")
                    && body["messages"][1]["content"] == json!("Do you do ceilings?");
                if !valid {
                    return StatusCode::BAD_REQUEST.into_response();
                }
                ([(header::CONTENT_TYPE, "text/event-stream")], SSE_BODY).into_response()
            }
            "busy" => StatusCode::TOO_MANY_REQUESTS.into_response(),
            "unpaid" => StatusCode::PAYMENT_REQUIRED.into_response(),
            _ => (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response(),
        }
    }

    async fn spawn_upstream() -> String {
        let app = Router::new().route("/{case}/chat/completions", post(fake_upstream));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(api_url: String, api_key: Option<&str>) -> ChatConfig {
        ChatConfig {
            api_url,
            api_key: api_key.map(str::to_string),
            model: "test-model".to_string(),
        }
    }

    fn chat_request() -> Request<Body> {
        Request::post("/api/chat")
            .header("content-type", "application/json")
            .header("origin", "https://beyondhouse.co.ke")
            .body(Body::from(
                json!({ "messages": [{ "role": "user", "content": "Do you do ceilings?" }] })
                    .to_string(),
            ))
            .unwrap()
    }

    async fn json_body(res: Response) -> Value {
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_chat_streams_upstream_events() {
        let base = spawn_upstream().await;
        let app = chat_routes(config(format!("{}/ok/chat/completions", base), Some("key")));

        let res = app.oneshot(chat_request()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/event-stream");
        assert_eq!(res.headers()["access-control-allow-origin"], "*");

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&body).unwrap(), SSE_BODY);
    }

    #[tokio::test]
    async fn test_upstream_errors_are_mapped() {
        let base = spawn_upstream().await;
        let cases = [
            ("busy", StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded. Please try again in a moment."),
            ("unpaid", StatusCode::PAYMENT_REQUIRED, "Service temporarily unavailable."),
            ("down", StatusCode::INTERNAL_SERVER_ERROR, "AI service error"),
        ];

        for (case, status, message) in cases {
            let app = chat_routes(config(
                format!("{}/{}/chat/completions", base, case),
                Some("key"),
            ));
            let res = app.oneshot(chat_request()).await.unwrap();
            assert_eq!(res.status(), status, "case {}", case);
            assert_eq!(json_body(res).await["error"], message);
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_is_server_error() {
        let app = chat_routes(config("http://127.0.0.1:9/unused".to_string(), None));
        let res = app.oneshot(chat_request()).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await["error"], "CHAT_API_KEY is not configured");
    }

    #[tokio::test]
    async fn test_preflight_allows_any_origin() {
        let app = chat_routes(config("http://127.0.0.1:9/unused".to_string(), None));
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/chat")
            .header("origin", "https://example.org")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type,apikey")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        let allowed = res.headers()["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .to_string();
        assert!(allowed.contains("apikey"));
        assert!(allowed.contains("x-client-info"));
    }
}

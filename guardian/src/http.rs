//! HTTP surface: `POST /chat` and a liveness probe.
//!
//! Every failure is answered with the same `{"reply": ...}` shape as a success so that
//! chat clients can render it directly. Causes go to the log, never to the body.

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::config::TimeoutStatus;
use crate::runtime::RuntimeBundle;
use crate::{ChatError, ChatErrorKind, ChatService, ChatTurnRequest, ContentPart, SessionId};

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
/// Large enough for a base64 encoded phone photo.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const LIVENESS: &str = "Guardian relay is running.";
const UNREADABLE_REPLY: &str = "I couldn't read your message. Could you try sending it again?";
const NOT_CONFIGURED_REPLY: &str =
    "I'm not set up to answer that right now. Please try again a little later.";
const FATAL_REPLY: &str =
    "Something went wrong on my side while thinking about that. Could you try again?";
const EXHAUSTED_REPLY: &str =
    "I'm having trouble reaching my thoughts right now. Please try again in a moment.";
const TIMEOUT_REPLY: &str = "That took me too long to answer. Please try again in a moment.";
const INTERNAL_REPLY: &str = "Something went wrong on my side. Please try again.";

#[derive(Clone)]
pub struct AppState {
    chat: ChatService,
    timeout_status: TimeoutStatus,
}

impl AppState {
    pub fn new(chat: ChatService, timeout_status: TimeoutStatus) -> Self {
        Self {
            chat,
            timeout_status,
        }
    }
}

impl From<&RuntimeBundle> for AppState {
    fn from(runtime: &RuntimeBundle) -> Self {
        Self::new(runtime.chat.clone(), runtime.timeout_status)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub message: Option<String>,
    /// Bare base64 or a `data:<mime>;base64,...` URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplyBody {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ReplyBody {
    fn failure(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            model: None,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS, Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(SESSION_HEADER)]);

    Router::new()
        .route("/", get(liveness))
        .route("/chat", post(chat))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn liveness() -> &'static str {
    LIVENESS
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let session = session_id(&headers, None);
            tracing::warn!(
                phase = "http",
                event = "unreadable_body",
                session = %session,
                status = StatusCode::BAD_REQUEST.as_u16(),
                error = %rejection.body_text()
            );
            return reply(StatusCode::BAD_REQUEST, ReplyBody::failure(UNREADABLE_REPLY));
        }
    };

    let session = session_id(&headers, payload.session.as_deref());
    let parts = match content_parts(&payload) {
        Ok(parts) => parts,
        Err(error) => return failure(&state, &session, &error),
    };

    match state
        .chat
        .submit(ChatTurnRequest::new(session.clone(), parts))
        .await
    {
        Ok(result) => {
            tracing::info!(
                phase = "http",
                event = "chat_reply",
                session = %session,
                status = StatusCode::OK.as_u16(),
                provider = %result.provider,
                model = %result.model,
                chain = result.chain.as_str(),
                attempts = result.attempts
            );
            reply(
                StatusCode::OK,
                ReplyBody {
                    reply: result.reply,
                    model: Some(result.model),
                },
            )
        }
        Err(error) => failure(&state, &session, &error),
    }
}

fn reply(status: StatusCode, body: ReplyBody) -> Response {
    (status, Json(body)).into_response()
}

fn failure(state: &AppState, session: &SessionId, error: &ChatError) -> Response {
    let status = status_for(error.kind, state.timeout_status);
    if status.is_server_error() {
        tracing::error!(
            phase = "http",
            event = "chat_failed",
            session = %session,
            status = status.as_u16(),
            error_kind = ?error.kind,
            error = %error.message
        );
    } else {
        tracing::warn!(
            phase = "http",
            event = "chat_rejected",
            session = %session,
            status = status.as_u16(),
            error_kind = ?error.kind,
            error = %error.message
        );
    }

    reply(status, ReplyBody::failure(reply_text(error.kind, status)))
}

pub fn status_for(kind: ChatErrorKind, timeout_status: TimeoutStatus) -> StatusCode {
    match kind {
        ChatErrorKind::Validation => StatusCode::BAD_REQUEST,
        ChatErrorKind::ProviderNotConfigured | ChatErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ChatErrorKind::FatalProvider => StatusCode::BAD_GATEWAY,
        ChatErrorKind::ChainExhausted { timed_out: true }
            if timeout_status == TimeoutStatus::Distinct =>
        {
            StatusCode::GATEWAY_TIMEOUT
        }
        ChatErrorKind::ChainExhausted { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn reply_text(kind: ChatErrorKind, status: StatusCode) -> &'static str {
    match kind {
        ChatErrorKind::Validation => UNREADABLE_REPLY,
        ChatErrorKind::ProviderNotConfigured => NOT_CONFIGURED_REPLY,
        ChatErrorKind::FatalProvider => FATAL_REPLY,
        ChatErrorKind::ChainExhausted { .. } if status == StatusCode::GATEWAY_TIMEOUT => {
            TIMEOUT_REPLY
        }
        ChatErrorKind::ChainExhausted { .. } => EXHAUSTED_REPLY,
        ChatErrorKind::Internal => INTERNAL_REPLY,
    }
}

/// Header first, then the body field, then the shared default session.
fn session_id(headers: &HeaderMap, body_session: Option<&str>) -> SessionId {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .or(body_session)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(SessionId::from)
        .unwrap_or_default()
}

fn content_parts(payload: &ChatPayload) -> Result<Vec<ContentPart>, ChatError> {
    let mut parts = Vec::new();

    if let Some(message) = payload.message.as_deref()
        && !message.trim().is_empty()
    {
        parts.push(ContentPart::text(message.trim()));
    }

    if let Some(image) = payload.image.as_deref()
        && !image.trim().is_empty()
    {
        let (mime_type, data) = decode_image(image, payload.mime_type.as_deref())?;
        parts.push(ContentPart::image(mime_type, data));
    }

    if parts.is_empty() {
        return Err(ChatError::validation("request carried no message or image"));
    }

    Ok(parts)
}

/// Accepts bare base64 or a `data:` URL; the URL's media type wins over `mime_type`.
pub fn decode_image(image: &str, mime_type: Option<&str>) -> Result<(String, Vec<u8>), ChatError> {
    let image = image.trim();
    let (url_mime, encoded) = match image.strip_prefix("data:") {
        Some(rest) => {
            let (meta, encoded) = rest
                .split_once(',')
                .ok_or_else(|| ChatError::validation("image data URL has no payload"))?;
            let mime = meta
                .strip_suffix(";base64")
                .ok_or_else(|| ChatError::validation("image data URL must be base64 encoded"))?;
            (Some(mime), encoded)
        }
        None => (None, image),
    };

    let compact = encoded
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect::<String>();
    let data = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| ChatError::validation("image is not valid base64"))?;

    let mime_type = url_mime
        .or(mime_type)
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_ascii_lowercase();

    Ok((mime_type, data))
}

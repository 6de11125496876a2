//! HTTP surface: shared state, payload types, and the contact handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{HeaderMap, StatusCode, request::Parts},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::github::{self, IssueSink, NewIssue};
use crate::throttle::Throttle;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub throttle: Throttle,
    /// None until both GITHUB_TOKEN and a repo are configured.
    pub issues: Option<Arc<dyn IssueSink>>,
    pub min_message_len: usize,
    pub max_message_len: usize,
}

pub type SharedState = Arc<AppState>;

// ── Request/response payload types ────────────────────────────────────

/// A contact form submission. Every field is optional on the wire; only
/// `message` is required after trimming.
#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Honeypot field: invisible in the real form, so any content means a bot.
    #[serde(default)]
    pub hp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub url: String,
}

// ── Client identity ───────────────────────────────────────────────────

/// Best-effort client identifier: `X-Forwarded-For` (first hop), then
/// `X-Real-IP`, then the peer socket address, then `"unknown"`.
pub struct ClientIp(pub String);

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            let first = value.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ip) = forwarded_ip(&parts.headers) {
            return Ok(ClientIp(ip));
        }
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientIp(ip))
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn submit_contact(
    State(state): State<SharedState>,
    ClientIp(client_ip): ClientIp,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let name = req.name.trim();
    let email = req.email.trim();
    let phone = req.phone.trim();
    let subject = req.subject.trim();
    let message = req.message.trim();
    let hp = req.hp.trim();

    if !hp.is_empty() {
        tracing::warn!(client = %client_ip, "Honeypot triggered, rejecting submission");
        return Err(ApiError::SpamDetected);
    }
    // Limits count characters, not bytes, so multibyte text is measured the
    // way the form user sees it.
    let message_chars = message.chars().count();
    if message_chars < state.min_message_len {
        return Err(ApiError::MessageRequired);
    }
    if message_chars > state.max_message_len {
        return Err(ApiError::MessageTooLong {
            max: state.max_message_len,
        });
    }

    state.throttle.check(&client_ip).inspect_err(|_| {
        tracing::warn!(client = %client_ip, "Throttled submission");
    })?;

    let sink = state.issues.as_ref().ok_or(ApiError::NotConfigured)?;

    let issue = NewIssue {
        title: github::issue_title(name, Utc::now()),
        body: github::issue_body(message, name, email, phone, subject, &client_ip),
    };

    let created = sink
        .create_issue(issue)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    tracing::info!(client = %client_ip, issue = created.number, "Filed contact submission");

    Ok((
        StatusCode::OK,
        Json(ContactResponse {
            success: true,
            url: created.html_url,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn forwarded_ip_takes_first_hop() {
        let map = headers(&[("x-forwarded-for", "1.2.3.4, 10.0.0.1")]);
        assert_eq!(forwarded_ip(&map).as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn forwarded_ip_falls_back_to_real_ip() {
        let map = headers(&[("x-real-ip", "5.6.7.8")]);
        assert_eq!(forwarded_ip(&map).as_deref(), Some("5.6.7.8"));
    }

    #[test]
    fn forwarded_ip_prefers_forwarded_for_over_real_ip() {
        let map = headers(&[("x-real-ip", "5.6.7.8"), ("x-forwarded-for", "1.2.3.4")]);
        assert_eq!(forwarded_ip(&map).as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn forwarded_ip_ignores_empty_values() {
        let map = headers(&[("x-forwarded-for", " , 10.0.0.1")]);
        assert_eq!(forwarded_ip(&map), None);
    }

    #[test]
    fn forwarded_ip_none_without_headers() {
        assert_eq!(forwarded_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn contact_request_fields_default_to_empty() {
        let req: ContactRequest = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(req.message, "hello");
        assert_eq!(req.name, "");
        assert_eq!(req.hp, "");
    }

    #[test]
    fn contact_request_rejects_non_object() {
        assert!(serde_json::from_str::<ContactRequest>("[1, 2]").is_err());
    }
}

//! Intercom REST client: posts admin comments back onto a conversation.

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use crate::domain::{ports::MessagingPlatform, DomainError};
use crate::infrastructure::config::IntercomConfig;

#[derive(Debug, Serialize)]
struct AdminReply<'a> {
    message_type: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_id: Option<&'a str>,
    body: &'a str,
}

pub struct IntercomClient {
    client: reqwest::Client,
    config: IntercomConfig,
}

impl IntercomClient {
    pub fn new(config: IntercomConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Appends `segments` to the base URL, each percent-encoded as a single path segment.
    fn api_url(&self, segments: &[&str]) -> Result<reqwest::Url, DomainError> {
        let mut url = reqwest::Url::parse(&self.config.base_url).map_err(|e| {
            DomainError::internal(format!("invalid Intercom base_url {}: {e}", self.config.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DomainError::internal(format!(
                    "Intercom base_url {} cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl MessagingPlatform for IntercomClient {
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    async fn reply_as_admin(&self, conversation_id: &str, body: &str) -> Result<(), DomainError> {
        let reply = AdminReply {
            message_type: "comment",
            kind: "admin",
            admin_id: self.config.admin_id.as_deref(),
            body,
        };

        let url = self.api_url(&["conversations", conversation_id, "reply"])?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .header("Accept", "application/json")
            .header("Intercom-Version", &self.config.api_version)
            .json(&reply)
            .send()
            .await
            .map_err(|e| DomainError::external(format!("Intercom request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::external(format!(
                "Intercom returned HTTP {status}: {body}"
            )));
        }

        tracing::info!(conversation_id, "reply posted to intercom");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode, Uri},
        routing::post,
        Json, Router,
    };
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(String, Option<String>, serde_json::Value)>>>;
    type Strays = Arc<Mutex<Vec<String>>>;

    async fn spawn_stub(status: StatusCode) -> (String, Captured) {
        let (base_url, captured, _strays) = spawn_stub_with_strays(status).await;
        (base_url, captured)
    }

    /// Like `spawn_stub`, also recording every request that misses the reply route.
    async fn spawn_stub_with_strays(status: StatusCode) -> (String, Captured, Strays) {
        let captured: Captured = Arc::default();
        let strays: Strays = Arc::default();
        let sink = captured.clone();
        let stray_sink = strays.clone();

        let app = Router::new()
            .route(
                "/conversations/{id}/reply",
                post(
                    move |Path(id): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<serde_json::Value>| {
                        let sink = sink.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            sink.lock().unwrap().push((id, auth, body));
                            status
                        }
                    },
                ),
            )
            .fallback(move |uri: Uri| {
                let stray_sink = stray_sink.clone();
                async move {
                    stray_sink.lock().unwrap().push(uri.to_string());
                    StatusCode::NOT_FOUND
                }
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), captured, strays)
    }

    fn config(base_url: String) -> IntercomConfig {
        IntercomConfig {
            base_url,
            access_token: "secret-token".to_string(),
            admin_id: Some("42".to_string()),
            ..IntercomConfig::default()
        }
    }

    #[tokio::test]
    async fn test_reply_posts_admin_comment() {
        let (base_url, captured) = spawn_stub(StatusCode::OK).await;
        let client = IntercomClient::new(config(base_url));

        client.reply_as_admin("conv-7", "We open at 9am.").await.unwrap();

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let (id, auth, body) = &captured[0];
        assert_eq!(id, "conv-7");
        assert_eq!(auth.as_deref(), Some("Bearer secret-token"));
        assert_eq!(body["message_type"], "comment");
        assert_eq!(body["type"], "admin");
        assert_eq!(body["admin_id"], "42");
        assert_eq!(body["body"], "We open at 9am.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_external_error() {
        let (base_url, _captured) = spawn_stub(StatusCode::UNAUTHORIZED).await;
        let client = IntercomClient::new(config(base_url));

        let err = client.reply_as_admin("conv-7", "hi").await.unwrap_err();

        assert!(matches!(err, DomainError::ExternalService(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_conversation_id_stays_a_single_path_segment() {
        let (base_url, captured, strays) = spawn_stub_with_strays(StatusCode::OK).await;
        let client = IntercomClient::new(config(format!("{base_url}/")));

        client
            .reply_as_admin("1/../../admins/9/away?x=", "hi")
            .await
            .unwrap();

        assert!(strays.lock().unwrap().is_empty());
        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].0, "1/../../admins/9/away?x=");
    }

    #[test]
    fn test_api_url_encodes_segments() {
        let client = IntercomClient::new(config("https://api.intercom.io".to_string()));

        let url = client.api_url(&["conversations", "a/b?c#d", "reply"]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.intercom.io/conversations/a%2Fb%3Fc%23d/reply"
        );
    }

    #[test]
    fn test_unusable_base_url_is_internal_error() {
        let client = IntercomClient::new(config("not a url".to_string()));
        let err = client.api_url(&["conversations"]).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}

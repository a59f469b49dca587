//! Client for the remote responder gateway.
//!
//! The gateway is an n8n automation webhook: one POST per conversational
//! turn, JSON in, JSON out. The response body is either a single reply
//! object or an array of them; single objects are normalized into a
//! one-element sequence so callers always iterate.
//!
//! # Failure policy
//!
//! The chat must never dead-end on a transport problem. Non-2xx statuses,
//! network errors, and malformed bodies are absorbed here and surfaced as
//! a single canned apology payload; [`ResponderGateway::send`] is
//! infallible by contract. Exactly one attempt per call, no retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::session::SessionContext;

/// Canned reply used when the webhook cannot be reached.
pub const CONNECTION_APOLOGY: &str = "Desculpe, estou com dificuldade para me conectar ao \
    servidor. Por favor, tente novamente em alguns instantes.";

/// One reply object from the gateway. Only `output` is meaningful to the
/// sequencer; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplyPayload {
    #[serde(default)]
    pub output: Option<String>,
}

impl ReplyPayload {
    /// A payload carrying the given reply text.
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
        }
    }

    /// The degraded-failure payload.
    pub fn apology() -> Self {
        Self::text(CONNECTION_APOLOGY)
    }
}

/// Wire shape of the response: one object or an array of objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyBody {
    Many(Vec<ReplyPayload>),
    One(ReplyPayload),
}

impl ReplyBody {
    fn into_payloads(self) -> Vec<ReplyPayload> {
        match self {
            ReplyBody::Many(payloads) => payloads,
            ReplyBody::One(payload) => vec![payload],
        }
    }
}

/// Wire shape of one outgoing conversational turn.
#[derive(Debug, Serialize)]
struct TurnRequest<'a> {
    message: &'a str,
    #[serde(rename = "sessionId")]
    session_id: &'a str,
    section: &'a str,
}

/// Gateway-internal error. Never escapes [`ResponderGateway::send`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

/// A remote endpoint that turns one user message into reply payloads.
///
/// Implementations must degrade failures into payloads rather than
/// returning errors; the sequencer proceeds uniformly either way.
#[async_trait]
pub trait ResponderGateway: Send + Sync {
    async fn send(&self, message: &str, session: &SessionContext) -> Vec<ReplyPayload>;
}

/// HTTP implementation backed by the n8n webhook.
pub struct WebhookGateway {
    client: reqwest::Client,
    url: String,
}

impl WebhookGateway {
    /// Build a gateway for the given endpoint. The timeout bounds the
    /// whole round-trip; hitting it is treated like any other transport
    /// failure.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn try_send(
        &self,
        message: &str,
        session: &SessionContext,
    ) -> Result<Vec<ReplyPayload>, GatewayError> {
        let request = TurnRequest {
            message,
            session_id: session.id(),
            section: session.section(),
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let body: ReplyBody = response.json().await?;
        Ok(body.into_payloads())
    }
}

#[async_trait]
impl ResponderGateway for WebhookGateway {
    async fn send(&self, message: &str, session: &SessionContext) -> Vec<ReplyPayload> {
        match self.try_send(message, session).await {
            Ok(payloads) => {
                debug!(count = payloads.len(), "gateway replied");
                payloads
            }
            Err(e) => {
                warn!(error = %e, "gateway call failed, degrading to canned reply");
                vec![ReplyPayload::apology()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object_normalizes_to_one_payload() {
        let body: ReplyBody = serde_json::from_str(r#"{"output": "Oi!"}"#).unwrap();
        assert_eq!(body.into_payloads(), vec![ReplyPayload::text("Oi!")]);
    }

    #[test]
    fn test_array_passes_through_in_order() {
        let body: ReplyBody =
            serde_json::from_str(r#"[{"output": "a"}, {"output": "b"}]"#).unwrap();
        assert_eq!(
            body.into_payloads(),
            vec![ReplyPayload::text("a"), ReplyPayload::text("b")]
        );
    }

    #[test]
    fn test_missing_output_field_is_none() {
        let body: ReplyBody = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(body.into_payloads(), vec![ReplyPayload::default()]);
    }

    #[test]
    fn test_turn_request_wire_shape() {
        let session = SessionContext::new("main");
        let request = TurnRequest {
            message: "Olá",
            session_id: session.id(),
            section: session.section(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "Olá");
        assert_eq!(json["sessionId"], session.id());
        assert_eq!(json["section"], "main");
    }
}

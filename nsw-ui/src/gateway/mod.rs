//! Request gateway
//!
//! Wraps every backend call behind one contract: serialize the body, issue
//! exactly one request, decode the tagged envelope, and yield either the
//! success payload or a [`GatewayError`]. The gateway never retries and never
//! touches workflow state.

mod transport;

pub use transport::{HttpTransport, TransportError};

use async_trait::async_trait;
use nsw_common::api::{decode_envelope, Endpoint, Envelope};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::GatewayError;

/// Issues one POST to a backend endpoint and returns the raw response body
///
/// `body` of None means the request carries no body at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Vec<u8>, TransportError>;
}

/// Uniform async access to the backend
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Call `endpoint` with a JSON body
    pub async fn call<Req, Resp>(&self, endpoint: Endpoint, request: &Req) -> Result<Resp, GatewayError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_value(request)
            .map_err(|e| GatewayError::Transport(format!("could not encode request: {}", e)))?;
        self.dispatch(endpoint, Some(body)).await
    }

    /// Call `endpoint` without any request body
    pub async fn call_without_body<Resp>(&self, endpoint: Endpoint) -> Result<Resp, GatewayError>
    where
        Resp: DeserializeOwned,
    {
        self.dispatch(endpoint, None).await
    }

    async fn dispatch<Resp>(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Resp, GatewayError>
    where
        Resp: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, %endpoint, has_body = body.is_some(), "Issuing backend request");

        let raw = self.transport.post(endpoint, body).await.map_err(|e| {
            tracing::warn!(%request_id, %endpoint, error = %e, "Backend request failed");
            GatewayError::Transport(e.to_string())
        })?;

        match decode_envelope::<Resp>(&raw) {
            Ok(Envelope::Success(payload)) => {
                tracing::debug!(%request_id, %endpoint, bytes = raw.len(), "Backend request succeeded");
                Ok(payload)
            }
            Ok(Envelope::Failure { message }) => {
                tracing::warn!(%request_id, %endpoint, %message, "Backend reported failure");
                Err(GatewayError::Backend(message))
            }
            Err(e) => {
                tracing::warn!(%request_id, %endpoint, error = %e, "Malformed backend response");
                Err(GatewayError::Transport(e.to_string()))
            }
        }
    }
}

//! JSON-RPC transport abstraction.
//!
//! Adapters talk to their node through this trait so tests can substitute a
//! canned transport. The error variants preserve the distinction the rest
//! of the client depends on: a timeout is "pending evidence", a node error
//! object keeps its code, and everything else is an opaque transport
//! failure.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
	/// The request timed out before the node answered.
	#[error("request timed out")]
	Timeout,

	/// The node answered with a JSON-RPC error object.
	#[error("rpc error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("transport error: {0}")]
	Http(String),

	#[error("malformed response: {0}")]
	Malformed(String),
}

#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
	async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError>;
}

/// reqwest-backed transport speaking JSON-RPC over HTTP, with optional
/// basic-auth credentials.
pub struct HttpTransport {
	client: reqwest::Client,
	url: String,
	user: Option<String>,
	password: Option<String>,
}

impl HttpTransport {
	pub fn new(
		url: impl Into<String>,
		user: Option<String>,
		password: Option<String>,
		timeout: Duration,
	) -> Result<Self, TransportError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| TransportError::Http(e.to_string()))?;
		Ok(Self {
			client,
			url: url.into(),
			user,
			password,
		})
	}
}

#[async_trait]
impl JsonRpcTransport for HttpTransport {
	async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
		debug!(method, "json-rpc request");
		let body = serde_json::json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params,
		});

		let mut request = self.client.post(&self.url).json(&body);
		if let Some(user) = &self.user {
			request = request.basic_auth(user, self.password.as_deref());
		}

		let response = request.send().await.map_err(|e| {
			if e.is_timeout() {
				TransportError::Timeout
			} else {
				TransportError::Http(e.to_string())
			}
		})?;

		let envelope: Value = response
			.json()
			.await
			.map_err(|e| TransportError::Malformed(e.to_string()))?;

		if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
			return Err(TransportError::Rpc {
				code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
				message: error
					.get("message")
					.and_then(Value::as_str)
					.unwrap_or("unknown")
					.to_string(),
			});
		}

		Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
	}
}

//! REST backend client.
//!
//! Endpoints under a `/cli` base path wrap every answer in a
//! `{result, error, errorMessage}` envelope. The client unwraps it and turns
//! `result == null` with an `error` code into [`TheaError::ApiResponseError`].
//! Any other base path returns the body untouched.

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use thea_types::{HttpMethod, HttpResponseIn, TheaError};

const CLI_SUFFIX: &str = "/cli";

/// HTTP client for the Thea backend.
///
/// Keeps a cookie store so the session established by login is reused by
/// later calls on the same client.
#[derive(Debug, Clone)]
pub struct HttpClient {
	client: Client,
	base_url: String,
	unwrap_envelope: bool,
}

impl HttpClient {
	/// Creates a client rooted at `base_url`.
	pub fn new(base_url: &str) -> Result<Self, TheaError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.cookie_store(true)
			.build()
			.map_err(|e| TheaError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

		let base_url = base_url.trim_end_matches('/').to_string();
		let unwrap_envelope = base_url.ends_with(CLI_SUFFIX);

		Ok(Self {
			client,
			base_url,
			unwrap_envelope,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// POSTs a JSON body and decodes the answer.
	pub async fn post<Req, Res>(&self, path: &str, body: &Req) -> Result<Res, TheaError>
	where
		Req: Serialize + ?Sized,
		Res: DeserializeOwned,
	{
		let request = self.client.post(self.url(path)).json(body);
		self.execute(HttpMethod::Post, path, request).await
	}

	/// GETs `path` with the given query parameters.
	pub async fn get<Res>(&self, path: &str, query: &[(&str, &str)]) -> Result<Res, TheaError>
	where
		Res: DeserializeOwned,
	{
		let request = self.client.get(self.url(path)).query(query);
		self.execute(HttpMethod::Get, path, request).await
	}

	fn url(&self, path: &str) -> String {
		if path.is_empty() || path.starts_with('/') {
			format!("{}{}", self.base_url, path)
		} else {
			format!("{}/{}", self.base_url, path)
		}
	}

	async fn execute<Res>(
		&self,
		method: HttpMethod,
		path: &str,
		request: RequestBuilder,
	) -> Result<Res, TheaError>
	where
		Res: DeserializeOwned,
	{
		let call_error = |message: String| TheaError::ApiCallError {
			method,
			path: path.to_string(),
			message,
		};

		tracing::debug!(%method, path, "Calling backend");

		let response = request.send().await.map_err(|e| call_error(e.to_string()))?;
		let status = response.status();
		let text = response.text().await.map_err(|e| call_error(e.to_string()))?;

		if !status.is_success() {
			// The backend reports business errors with non-2xx codes too.
			if self.unwrap_envelope {
				if let Ok(envelope) = serde_json::from_str::<HttpResponseIn<Value>>(&text) {
					if let Some(err) = envelope_error(&envelope) {
						return Err(err);
					}
				}
			}
			tracing::warn!(%method, path, %status, "Backend call failed");
			return Err(call_error(format!("{}: {}", status, text)));
		}

		let body: Value = if text.trim().is_empty() {
			Value::Null
		} else {
			serde_json::from_str(&text).map_err(|e| call_error(format!("Invalid JSON: {}", e)))?
		};

		let payload = if self.unwrap_envelope {
			unwrap_envelope(body)?
		} else {
			body
		};

		serde_json::from_value(payload)
			.map_err(|e| call_error(format!("Unexpected response shape: {}", e)))
	}
}

fn envelope_error(envelope: &HttpResponseIn<Value>) -> Option<TheaError> {
	match (&envelope.result, &envelope.error) {
		(None, Some(code)) => Some(TheaError::ApiResponseError {
			code: code.clone(),
			message: envelope.error_message.clone().unwrap_or_default(),
		}),
		_ => None,
	}
}

fn unwrap_envelope(body: Value) -> Result<Value, TheaError> {
	let envelope: HttpResponseIn<Value> = match serde_json::from_value(body.clone()) {
		Ok(envelope) => envelope,
		// Not an envelope at all; hand back what we got.
		Err(_) => return Ok(body),
	};

	if let Some(err) = envelope_error(&envelope) {
		return Err(err);
	}
	Ok(envelope.result.unwrap_or(Value::Null))
}

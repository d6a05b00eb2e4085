//! GraphQL subgraph client.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thea_types::{HttpMethod, TheaError};

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
	query: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	variables: Option<Value>,
}

/// Read-only client for the indexed chain history.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
	client: Client,
	url: String,
}

impl SubgraphClient {
	pub fn new(url: &str) -> Result<Self, TheaError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| TheaError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			url: url.to_string(),
		})
	}

	/// Runs a query and decodes its `data` member.
	///
	/// A response carrying `errors` fails with `SubgraphCallError` holding the
	/// raw error list.
	pub async fn query<T>(&self, query: &str, variables: Option<Value>) -> Result<T, TheaError>
	where
		T: DeserializeOwned,
	{
		let call_error = |message: String| TheaError::ApiCallError {
			method: HttpMethod::Post,
			path: String::new(),
			message,
		};

		let response = self
			.client
			.post(&self.url)
			.json(&GraphQlRequest { query, variables })
			.send()
			.await
			.map_err(|e| call_error(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let text = response.text().await.unwrap_or_default();
			return Err(call_error(format!("{}: {}", status, text)));
		}

		let mut body: Value = response
			.json()
			.await
			.map_err(|e| call_error(format!("Invalid JSON: {}", e)))?;

		if let Some(errors) = body.get("errors").and_then(Value::as_array) {
			if !errors.is_empty() {
				let message = errors
					.iter()
					.filter_map(|e| e.get("message").and_then(Value::as_str))
					.collect::<Vec<_>>()
					.join("; ");
				tracing::warn!(errors = errors.len(), "Subgraph returned errors");
				return Err(TheaError::SubgraphCallError {
					message: if message.is_empty() {
						"Subgraph call failed".to_string()
					} else {
						message
					},
					errors: errors.clone(),
				});
			}
		}

		let data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);
		serde_json::from_value(data).map_err(|e| call_error(format!("Unexpected data shape: {}", e)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;
	use serde_json::json;
	use wiremock::matchers::{body_json, method};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[derive(Debug, Deserialize)]
	struct Tokens {
		tokens: Vec<Value>,
	}

	#[tokio::test]
	async fn test_query_returns_data() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(body_json(json!({
				"query": "{ tokens { id } }",
				"variables": { "first": 1 }
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"data": { "tokens": [{ "id": "1" }] }
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = SubgraphClient::new(&server.uri()).unwrap();
		let result: Tokens = client
			.query("{ tokens { id } }", Some(json!({ "first": 1 })))
			.await
			.unwrap();
		assert_eq!(result.tokens.len(), 1);
	}

	#[tokio::test]
	async fn test_graphql_errors_are_surfaced() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"errors": [{ "message": "Type `Query` has no field `foo`" }]
			})))
			.mount(&server)
			.await;

		let client = SubgraphClient::new(&server.uri()).unwrap();
		match client.query::<Value>("{ foo }", None).await {
			Err(TheaError::SubgraphCallError { message, errors }) => {
				assert!(message.contains("no field"));
				assert_eq!(errors.len(), 1);
			},
			other => panic!("unexpected result {other:?}"),
		}
	}
}

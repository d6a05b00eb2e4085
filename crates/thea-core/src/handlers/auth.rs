//! Backend session login through a signed challenge.

use serde_json::{json, Value};
use std::sync::Arc;
use thea_types::{ClientProfile, TheaError};

use crate::engine::{ClientContext, RequestBuilder};

pub struct AuthHandler {
	ctx: Arc<ClientContext>,
}

impl AuthHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	/// Signs the backend's login challenge and opens a session.
	///
	/// The session cookie is kept by the client's HTTP cookie store.
	pub async fn login(&self) -> Result<ClientProfile, TheaError> {
		self.ctx.credentials.typed_data_signer()?;
		let owner = self.ctx.owner()?;

		let challenge: String = self
			.ctx
			.api
			.post("/requestSignLogin", &json!({ "ethAddr": owner.to_checksum(None) }))
			.await?;
		let signature = RequestBuilder::new(&self.ctx)
			.auth_message(&challenge)
			.await?
			.to_backend_format();

		let profile: ClientProfile = self
			.ctx
			.api
			.post(
				"/signLogin",
				&json!({ "challenge": challenge, "signature": signature }),
			)
			.await?;
		tracing::info!(%owner, uuid = %profile.uuid, "Logged in");
		Ok(profile)
	}

	/// Closes the backend session.
	pub async fn logout(&self) -> Result<Option<String>, TheaError> {
		self.ctx.api.post("/logout", &Value::Null).await
	}
}

//! Listing of the VCC tokens indexed by the subgraph.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thea_types::{TheaError, TokenInfo};
use tracing::instrument;

use crate::engine::ClientContext;

const TOKEN_LIST_QUERY: &str = "{ tokens(orderBy: projectId) { id tokenURI projectId vintage activeAmount mintedAmount retiredAmount unwrappedAmount } }";

#[derive(Debug, Deserialize)]
struct TokensData {
	tokens: Vec<TokenInfo>,
}

pub struct TokenListHandler {
	ctx: Arc<ClientContext>,
}

impl TokenListHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	/// Every indexed VCC token, grouped by project id.
	///
	/// Tokens keep the subgraph order within a project.
	#[instrument(skip_all)]
	pub async fn token_list(&self) -> Result<BTreeMap<String, Vec<TokenInfo>>, TheaError> {
		let data: TokensData = self
			.ctx
			.subgraph
			.query(TOKEN_LIST_QUERY, None)
			.await
			.map_err(|e| match e {
				TheaError::SubgraphCallError { errors, .. } => TheaError::SubgraphCallError {
					message: "Subgraph call error when trying to query tokens".to_string(),
					errors,
				},
				other => other,
			})?;

		let mut projects: BTreeMap<String, Vec<TokenInfo>> = BTreeMap::new();
		for token in data.tokens {
			projects.entry(token.project_id.clone()).or_default().push(token);
		}
		tracing::debug!(projects = projects.len(), "Loaded token list");
		Ok(projects)
	}
}

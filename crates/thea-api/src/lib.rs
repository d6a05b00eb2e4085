//! Off-chain clients for the Thea SDK.
//!
//! [`HttpClient`] talks to the REST backend and [`SubgraphClient`] to the
//! GraphQL indexer. Both map every failure onto [`thea_types::TheaError`].

pub mod http;
pub mod subgraph;

pub use http::HttpClient;
pub use subgraph::SubgraphClient;

//! Building blocks every action handler runs on.
//!
//! Handlers validate their arguments, then use the [`dispatcher`] to pick a
//! path, the [`token_manager`] for balances and approvals, the
//! [`typed_data`] builder for off-chain signatures and the [`extractor`] to
//! turn the resulting receipt into a typed result.

pub mod context;
pub mod contracts;
pub mod dispatcher;
pub mod extractor;
pub mod token_manager;
pub mod typed_data;

pub use context::ClientContext;
pub use dispatcher::{Dispatcher, ExecutionPath, DIRECT_EXECUTION_THRESHOLD};
pub use extractor::{Extracted, RequestIdEvent, TokenAmountEvent};
pub use token_manager::TokenManager;
pub use typed_data::RequestBuilder;

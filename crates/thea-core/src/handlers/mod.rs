//! Action handlers exposed by [`TheaClient`](crate::TheaClient).
//!
//! Each handler owns a shared [`ClientContext`](crate::engine::ClientContext)
//! and implements one family of actions. Arguments are validated before any
//! network access.

pub mod auth;
pub mod convert;
pub mod offset;
pub mod options;
pub mod recover;
pub mod registry;
pub mod tokens;
pub mod unwrap;

pub use auth::AuthHandler;
pub use convert::ConvertHandler;
pub use offset::OffsetHandler;
pub use options::OptionsHandler;
pub use recover::RecoverHandler;
pub use registry::{characteristic_key, FeatureValues, RegistryHandler};
pub use tokens::TokenListHandler;
pub use unwrap::UnwrapHandler;

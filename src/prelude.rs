//! Convenience re-exports for common use.

pub use crate::auth::{FileTokenStore, Session, TokenStore, TokenStoreConfig};
pub use crate::client::{ApiClient, ApiResponse};
pub use crate::config::BunkhouseConfig;
pub use crate::error::{BunkhouseError, Result};

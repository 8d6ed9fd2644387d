//! Bunkhouse — async client for JWT-authenticated hostel-management APIs.
//!
//! Wraps a token-authenticated REST backend behind a small verb surface
//! (`get`/`post`/`put`/`patch`/`delete`) with transparent single-flight
//! token refresh: when concurrent requests fail with an authorization
//! error, exactly one refresh exchange runs, every affected request is
//! replayed with the new access token, and a failed refresh clears the
//! session and notifies the host application once.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use bunkhouse::prelude::*;
//!
//! # async fn example() -> bunkhouse::error::Result<()> {
//! let config = BunkhouseConfig::new("http://localhost:8000/api");
//! let client = ApiClient::new(config, Arc::new(FileTokenStore::new_default()))?;
//! client.login("amrita", "hunter2").await?;
//! let outpasses = client.get("/v1/outpasses/").await?;
//! println!("{}", outpasses.data);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;

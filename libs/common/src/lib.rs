//! Common library for the back-office admin clients
//!
//! This crate provides shared functionality used by the service clients,
//! including configuration, the authenticated HTTP client, the response
//! cache, the session boundary and error handling.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ValidationErrors};
pub use http::{ApiClient, GridQuery, ListPayload, ReadPolicy, SortDirection};
pub use session::{SessionHandle, TokenProvider};

/// Example usage of the HTTP client
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use common::{ApiClient, ClientConfig, ReadPolicy, SessionHandle};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::from_env()?;
///     let session = SessionHandle::with_token("token");
///     let client = ApiClient::new(&config, Arc::new(session))?;
///     let options: serde_json::Value = client.get("menu/options", &[], ReadPolicy::Cached).await?;
///     println!("Menu options: {}", options);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}

// --- File: crates/slotwise_common/src/http/client.rs ---
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// User agent sent with every outbound request.
pub const DEFAULT_USER_AGENT: &str = "slotwise/0.1";

/// Creates a new HTTP client with custom configuration.
///
/// # Arguments
///
/// * `timeout` - Connect and total request timeout
/// * `follow_redirects` - Whether the client should follow redirects
///
/// # Returns
///
/// A new reqwest::Client instance with the specified configuration
pub fn create_client(timeout: Duration, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .connect_timeout(timeout)
        .timeout(timeout)
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}

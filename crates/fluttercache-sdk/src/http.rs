//! HTTP client construction for manifest and archive requests

use reqwest::blocking::Client;
use std::time::Duration;

/// Timeout for the release manifest request
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection timeout shared by every request
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Overall timeout for SDK archive downloads (archives are ~1 GB)
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// User agent for fluttercache requests
pub const USER_AGENT: &str = concat!("fluttercache/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client with the given overall timeout
///
/// # Errors
///
/// Returns error if client construction fails
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
}

//! Shared HTTP client construction.

use std::time::Duration;

/// `User-Agent` sent with every outbound request.
pub const USER_AGENT: &str = concat!("Moonglade/", env!("CARGO_PKG_VERSION"));

/// Build the client used for source inspection and outbound pings.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

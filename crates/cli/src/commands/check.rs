//! Remote API reachability check.
//!
//! # Usage
//!
//! ```bash
//! gb-cli check
//! ```
//!
//! Exits non-zero when the remote commerce API does not answer, which makes
//! the command usable from deploy scripts and cron probes.

use thiserror::Error;

use greenbasket_storefront::commerce::CommerceError;

use super::client_from_env;

/// Errors that can occur during the API check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The remote API did not answer with a success status.
    #[error("Commerce API unreachable: {0}")]
    Unreachable(#[from] CommerceError),
}

/// Probe the remote commerce API.
#[allow(clippy::print_stdout)]
pub async fn run() -> Result<(), CheckError> {
    let client = client_from_env();

    client.ping().await?;
    println!("Commerce API is reachable");

    Ok(())
}

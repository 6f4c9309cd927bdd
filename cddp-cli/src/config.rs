//! Configuration module
//!
//! Handles CLI configuration.

use cddp_client::CddpClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the CDDP server
    pub server_url: String,
}

impl Config {
    pub fn client(&self) -> CddpClient {
        CddpClient::new(&self.server_url)
    }
}

//! Helpers shared by the HTTP-facing tests.

use reqwest::blocking::Client;

/// Client that ignores proxy settings from the environment, so requests
/// reach the local mock server.
pub fn test_client() -> Client {
    Client::builder()
        .no_proxy()
        .build()
        .expect("build test http client")
}

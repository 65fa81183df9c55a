//! Shared test utilities and mock infrastructure.

#![allow(dead_code)]

pub mod mock_backend;

use std::net::TcpListener;

use dataflow_launcher::config::Config;

/// Find a port nothing is listening on.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Config pointing both Google APIs at `base_url`, with a fast retry policy
/// and the token read from `token_env_var`.
pub fn test_config(base_url: &str, token_env_var: &str) -> Config {
    let mut config = Config::default();
    config.dataflow.endpoint = base_url.to_string();
    config.dataflow.storage_endpoint = base_url.to_string();
    config.dataflow.timeout_seconds = 5;
    config.dataflow.connect_timeout_seconds = 1;
    config.retry.max_attempts = 3;
    config.retry.delay_ms = 10;
    config.auth.token_env_var = token_env_var.to_string();
    config
}

pub fn raw_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

// Utility functions for the portfolio API

use std::net::SocketAddr;

/// Treat empty strings the same as missing values
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Rate limit key for a peer; the port changes per connection so only the IP is used
pub fn client_key(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

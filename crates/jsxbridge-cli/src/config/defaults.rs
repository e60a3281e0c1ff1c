/// Default companion extension host.
pub fn default_dev_connect_host() -> String {
    "localhost".to_string()
}

/// Log server port suggested by the example config.
pub fn default_log_server_port() -> u16 {
    8123
}

// Configuration module entry point
// Loads layered configuration and holds shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LibraryConfig, LoggingConfig, PerformanceConfig, ServerConfig};

impl Config {
    /// Load configuration from the default file name ("config.toml")
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; defaults reproduce the stock behavior of
    /// serving `./pdfs` on port 8080. `SERVER_*` environment variables
    /// override file values.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("library.dir", "./pdfs")?
            .set_default("library.listing_path", "/api/pdfs")?
            .set_default("library.file_prefix", "/pdfs/")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "PdfShelf/0.1")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_behavior() {
        let cfg = Config::load_from("does-not-exist").expect("defaults should load");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.library.dir, "./pdfs");
        assert_eq!(cfg.library.listing_path, "/api/pdfs");
        assert_eq!(cfg.library.file_prefix, "/pdfs/");
        assert!(cfg.logging.access_log);
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_socket_addr_parses() {
        let cfg = Config::load_from("does-not-exist").expect("defaults should load");
        let addr = cfg.socket_addr().expect("valid address");
        assert_eq!(addr.port(), 8080);
    }
}

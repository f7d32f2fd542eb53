use thiserror::Error;

/// Errors that can occur when starting the Waypoint server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// An I/O error (e.g. reading the config file or binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The outbound HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] waypoint_http::HttpError),

    /// The engine rejected its wiring.
    #[error("engine error: {0}")]
    Engine(#[from] waypoint_core::Fault),
}

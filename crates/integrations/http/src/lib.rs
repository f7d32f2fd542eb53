pub mod config;
pub mod error;
pub mod runner;

pub use config::HttpRunnerConfig;
pub use error::HttpError;
pub use runner::HttpRequestRunner;

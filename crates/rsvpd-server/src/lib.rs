pub mod admin;
pub mod config;
pub mod export;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::{AdminConfig, AppConfig, LoggingConfig, ServerConfig, StorageConfig};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, RsvpdServer, ServerBuilder, build_app};

pub mod config;
pub mod error;
pub mod payload;
pub mod photos;
pub mod relay;
pub mod webhook;

pub use config::{ImageHostConfig, RelayEndpoint};
pub use error::RelayError;
pub use photos::ImageHost;
pub use relay::SyncRelay;
pub use webhook::WebhookSender;

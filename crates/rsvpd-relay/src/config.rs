use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One external mirror endpoint the relay posts every mutation to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayEndpoint {
    pub url: String,
    /// Shared secret for the HMAC signature header, if the receiver
    /// verifies payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Extra request headers, e.g. an API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl RelayEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret: None,
            headers: None,
        }
    }
}

/// Image host used to turn submitted data-URI photos into shareable URLs
/// before records leave the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHostConfig {
    /// Upload endpoint, e.g. `https://images.example.com/v1/upload`.
    pub upload_url: String,
    /// Unsigned upload preset, if the host requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_preset: Option<String>,
    /// Target folder for uploaded photos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

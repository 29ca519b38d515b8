//! Photo resolution: submitted data-URI photos are uploaded to the image
//! host and replaced by the resulting URL before a record leaves the
//! system. Failures degrade to an empty link; they never fail the
//! mutation being mirrored.

use reqwest::Client;
use tracing::warn;

use crate::config::ImageHostConfig;
use crate::error::RelayError;

pub struct ImageHost {
    http_client: Client,
    config: ImageHostConfig,
}

impl ImageHost {
    pub fn new(config: ImageHostConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }

    /// Upload a data-URI photo, returning the hosted URL.
    pub async fn upload(&self, data_uri: &str) -> Result<String, RelayError> {
        let mut form = vec![("file", data_uri.to_string())];
        if let Some(preset) = &self.config.upload_preset {
            form.push(("upload_preset", preset.clone()));
        }
        if let Some(folder) = &self.config.folder {
            form.push(("folder", folder.clone()));
        }

        let response = self
            .http_client
            .post(&self.config.upload_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RelayError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RelayError::UploadFailed(format!(
                "upload returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RelayError::UploadFailed(e.to_string()))?;
        body.get("secure_url")
            .or_else(|| body.get("url"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| RelayError::UploadFailed("response carried no url".into()))
    }
}

/// Resolve a stored photo into the link sent outward.
///
/// Already-hosted http(s) URLs pass through unchanged; data URIs go through
/// the image host; anything unresolvable becomes an empty string.
pub async fn resolve_photo(photo: Option<&str>, host: Option<&ImageHost>) -> String {
    let Some(photo) = photo else {
        return String::new();
    };
    if photo.is_empty() || photo.starts_with("http") {
        return photo.to_string();
    }
    match host {
        Some(host) => match host.upload(photo).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Photo upload failed, sending empty link");
                String::new()
            }
        },
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_none_is_empty() {
        assert_eq!(resolve_photo(None, None).await, "");
    }

    #[tokio::test]
    async fn test_resolve_url_passes_through() {
        let url = "https://images.example.com/a.jpg";
        assert_eq!(resolve_photo(Some(url), None).await, url);
    }

    #[tokio::test]
    async fn test_resolve_data_uri_without_host_is_empty() {
        assert_eq!(
            resolve_photo(Some("data:image/jpeg;base64,AAAA"), None).await,
            ""
        );
    }
}

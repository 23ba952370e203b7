use crate::data_provider::DatasetSource;
use crate::error::WorkbenchError;
use async_trait::async_trait;
use bytes::Bytes;

/// Loads dataset files over HTTP from a base URL.
#[derive(Debug, Clone)]
pub struct UrlSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl UrlSource {
    /// Creates a source loading files from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, WorkbenchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("meridian/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(http_client, base_url))
    }

    /// Creates a source using the given HTTP client.
    pub fn with_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// URL of the file.
    pub fn file_url(&self, file: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            file.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DatasetSource for UrlSource {
    async fn load(&self, file: &str) -> Result<Bytes, WorkbenchError> {
        let url = self.file_url(file);
        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            log::info!("Failed to load {url}: {}", response.status());
            return Err(WorkbenchError::Network(format!(
                "{url} responded with {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_url() {
        let source = UrlSource::new("https://example.com/data/").expect("no client");
        assert_eq!(
            source.file_url("layers.json"),
            "https://example.com/data/layers.json"
        );
        assert_eq!(
            source.file_url("/roads.geojson"),
            "https://example.com/data/roads.geojson"
        );
    }
}

use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failures that abort a whole sync run.
#[derive(Debug, Error)]
pub enum SyncRunError {
    #[error("Network error fetching source: {0}")]
    Network(String),
    #[error("Source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Where the listing sheet comes from.
pub trait SourceFetcher {
    fn fetch_document(&self) -> Result<String, SyncRunError>;
}

/// Downloads the published CSV export of the listing sheet.
pub struct HttpSourceFetcher {
    client: Client,
    url: Url,
}

impl HttpSourceFetcher {
    pub fn new(url: Url) -> Result<Self, SyncRunError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SyncRunError::Network(e.to_string()))?;

        Ok(Self { client, url })
    }
}

impl SourceFetcher for HttpSourceFetcher {
    fn fetch_document(&self) -> Result<String, SyncRunError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|e| SyncRunError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| SyncRunError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(SyncRunError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        // Sheet exports sometimes start with a UTF-8 BOM.
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

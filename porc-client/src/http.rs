//! HTTP client for the static dataset endpoints

use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::StaticDataset;
use shared::error::ApiResponse;
use shared::models::{FarmRecord, SlaughterhouseRecord};

use crate::{ClientConfig, ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct DatasetClient {
    client: Client,
    base_url: String,
}

impl DatasetClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.http_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a path returning an `ApiResponse<T>` envelope
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(envelope) => envelope.into_result().map_err(ClientError::from),
            Err(e) if status.is_success() => Err(ClientError::Serialization(e)),
            Err(_) => Err(ClientError::InvalidResponse(format!("{status}: {text}"))),
        }
    }

    /// Whole static dataset, indexed and ready for lookups
    pub async fn fetch_dataset(&self) -> ClientResult<StaticDataset> {
        let mut dataset: StaticDataset = self.get("/api/dataset").await?;
        dataset.reindex();
        Ok(dataset)
    }

    pub async fn fetch_farms(&self) -> ClientResult<Vec<FarmRecord>> {
        self.get("/api/farms").await
    }

    pub async fn fetch_slaughterhouses(&self) -> ClientResult<Vec<SlaughterhouseRecord>> {
        self.get("/api/slaughterhouses").await
    }
}

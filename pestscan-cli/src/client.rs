use anyhow::{anyhow, Context};
use pestscan_types::{Agrovet, Crop, Farm, NewCrop, NewFarm, Pest};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Thin JSON client for the pestscan REST API.
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {path}"))?;
        decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> anyhow::Result<T> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path}"))?;
        decode(resp).await
    }

    pub async fn pests(&self) -> anyhow::Result<Vec<Pest>> {
        self.get("/api/pests").await
    }

    pub async fn agrovets(&self) -> anyhow::Result<Vec<Agrovet>> {
        self.get("/api/agrovets").await
    }

    pub async fn farms(&self) -> anyhow::Result<Vec<Farm>> {
        self.get("/api/farms").await
    }

    pub async fn create_farm(&self, farm: &NewFarm) -> anyhow::Result<Farm> {
        self.post("/api/farms", farm).await
    }

    pub async fn crops(&self, farm_id: u64) -> anyhow::Result<Vec<Crop>> {
        self.get(&format!("/api/farms/{farm_id}/crops")).await
    }

    pub async fn create_crop(&self, farm_id: u64, crop: &NewCrop) -> anyhow::Result<Crop> {
        self.post(&format!("/api/farms/{farm_id}/crops"), crop).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> anyhow::Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|e| e.message)
        .unwrap_or(text);
    Err(anyhow!("server returned {status}: {message}"))
}

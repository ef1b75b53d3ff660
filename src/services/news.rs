use serde::{Deserialize, Serialize};

const NEWS_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";

/// Headline trimmed to the fields the frontend renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Headline {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("news request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to fetch news")]
    Fetch,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Headline>,
}

/// NewsAPI top-headlines passthrough.
pub struct NewsService {
    http: reqwest::Client,
    api_key: String,
}

impl NewsService {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    pub async fn top_headlines(&self, category: &str, limit: u32) -> Result<Vec<Headline>, NewsError> {
        let resp = self
            .http
            .get(NEWS_ENDPOINT)
            .query(&[
                ("category", category),
                ("pageSize", &limit.to_string()),
                ("apiKey", &self.api_key),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NewsError::Fetch);
        }

        let data: NewsResponse = resp.json().await?;
        Ok(data.articles)
    }
}

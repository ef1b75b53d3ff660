use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::assistant::AssistantService;
use crate::services::identity::{IdentityProvider, SupabaseIdentityProvider};
use crate::services::news::NewsService;
use crate::services::supabase::SupabaseClient;
use crate::services::tasks::{SupabaseTaskStore, TaskStore};
use crate::services::weather::WeatherService;

/// Process-wide provider handles. Built once at startup from configuration
/// and cloned into every request through axum state; lifecycle is the process
/// lifetime. No other mutable state is shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub tasks: Arc<dyn TaskStore>,
    pub assistant: Arc<AssistantService>,
    pub weather: Arc<WeatherService>,
    pub news: Arc<NewsService>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        let anon = SupabaseClient::new(http.clone(), &config.supabase.url, &config.supabase.anon_key);
        let admin = config
            .supabase
            .service_role_key
            .as_ref()
            .map(|key| SupabaseClient::new(http.clone(), &config.supabase.url, key));

        Ok(Self {
            identity: Arc::new(SupabaseIdentityProvider::new(anon.clone(), admin)),
            tasks: Arc::new(SupabaseTaskStore::new(anon)),
            assistant: Arc::new(AssistantService::new(
                http.clone(),
                config.gemini.api_key.clone(),
                config.gemini.model.clone(),
            )),
            weather: Arc::new(WeatherService::new(http.clone(), config.weather_api_key.clone())),
            news: Arc::new(NewsService::new(http, config.news_api_key.clone())),
        })
    }
}

use serde::Deserialize;
use serde_json::{json, Value};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const HISTORY_WINDOW: usize = 5;

/// One prior turn of a chat conversation as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("language model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("language model returned no completion")]
    EmptyCompletion,
}

/// Gemini-backed text completion for chat and task suggestions.
pub struct AssistantService {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AssistantService {
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self { http, api_key, model }
    }

    pub async fn generate_response(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, AssistantError> {
        self.complete(&chat_prompt(message, history)).await
    }

    pub async fn task_suggestions(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<String, AssistantError> {
        let prompt = format!(
            "Task: {}\nDescription: {}\n\nProvide 3 brief suggestions.",
            title,
            description.unwrap_or("None")
        );
        self.complete(&prompt).await
    }

    async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body: Value = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AssistantError::EmptyCompletion)
    }
}

/// Flattens the last few turns of history plus the new message into a single
/// plain-text prompt.
fn chat_prompt(message: &str, history: &[ChatTurn]) -> String {
    let mut prompt = String::from("You are a helpful personal assistant.\n\n");
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }
    prompt.push_str(&format!("user: {message}\nassistant:"));
    prompt
}

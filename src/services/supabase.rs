use reqwest::{Method, RequestBuilder};
use serde_json::Value;

/// Thin handle on the Supabase REST surface, one per API key. Two instances
/// exist for the process lifetime: the anon-key client used for every normal
/// operation, and an optional service-role client used only for the signup
/// auto-confirm step.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Request carrying only the `apikey` header. Callers that need an
    /// `Authorization` header set their own (e.g. a user token for
    /// `/auth/v1/user`).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
    }

    /// Request authorized as the key itself. PostgREST and the admin auth
    /// endpoints expect the key both as `apikey` and as bearer.
    pub fn request_as_key(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path).bearer_auth(&self.api_key)
    }
}

/// Best-effort extraction of the human-readable message from a provider error
/// body. GoTrue and PostgREST disagree on the field name depending on version
/// and endpoint.
pub fn error_message(body: &Value) -> String {
    for key in ["msg", "message", "error_description", "error"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    body.to_string()
}

/// Structured error code, present on newer GoTrue versions. Preferred over
/// message matching wherever available.
pub fn error_code(body: &Value) -> Option<&str> {
    body.get("error_code").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = SupabaseClient::new(reqwest::Client::new(), "http://x.test/", "k");
        assert_eq!(client.base_url, "http://x.test");
    }

    #[test]
    fn error_message_tries_known_fields() {
        assert_eq!(error_message(&json!({"msg": "User already registered"})), "User already registered");
        assert_eq!(
            error_message(&json!({"error": "invalid_grant", "error_description": "Invalid login credentials"})),
            "Invalid login credentials"
        );
        assert_eq!(error_message(&json!({"message": "row not found"})), "row not found");
        // Unknown shape falls back to the raw body
        assert!(error_message(&json!({"weird": 1})).contains("weird"));
    }

    #[test]
    fn error_code_reads_structured_field() {
        assert_eq!(error_code(&json!({"error_code": "user_already_exists"})), Some("user_already_exists"));
        assert_eq!(error_code(&json!({"msg": "nope"})), None);
    }
}

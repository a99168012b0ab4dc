//! Client configuration files for tests.

use serde_json::{Value, json};

/// The secret every fixture client uses unless told otherwise.
pub const TEST_SECRET: &str = "password";

/// Builder for a client configuration file.
#[derive(Debug, Clone)]
pub struct ClientFixture {
    record: Value,
}

impl ClientFixture {
    /// A client allowed to call `generate` through `openai`, with a token limit of 2000.
    pub fn new(client_id: &str) -> Self {
        let record = json!({
            "client_id": client_id,
            "name": format!("{client_id} (test)"),
            "client_secret_hash": ::clients::hash_secret(TEST_SECRET),
            "allowed_providers": ["openai"],
            "default_provider": "openai",
            "default_model": "gpt-3.5-turbo",
            "max_tokens_limit": 2000,
            "rate_limit": { "requests_per_minute": 60, "tokens_per_day": 100000 },
            "allowed_endpoints": ["generate"],
            "created_at": "2024-03-01T00:00:00Z",
            "updated_at": "2024-03-01T00:00:00Z"
        });

        Self { record }
    }

    pub fn client_id(&self) -> &str {
        self.record["client_id"].as_str().unwrap_or_default()
    }

    pub fn secret(mut self, secret: &str) -> Self {
        self.record["client_secret_hash"] = json!(::clients::hash_secret(secret));
        self
    }

    pub fn without_secret(mut self) -> Self {
        if let Some(record) = self.record.as_object_mut() {
            record.remove("client_secret_hash");
        }

        self
    }

    pub fn providers(mut self, providers: &[&str]) -> Self {
        self.record["allowed_providers"] = json!(providers);
        self
    }

    pub fn default_provider(mut self, provider: &str) -> Self {
        self.record["default_provider"] = json!(provider);
        self
    }

    pub fn default_model(mut self, model: &str) -> Self {
        self.record["default_model"] = json!(model);
        self
    }

    pub fn endpoints(mut self, endpoints: &[&str]) -> Self {
        self.record["allowed_endpoints"] = json!(endpoints);
        self
    }

    pub fn max_tokens_limit(mut self, limit: u64) -> Self {
        self.record["max_tokens_limit"] = json!(limit);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.record).unwrap()
    }
}
